mod app;
mod prompt;
mod stats;

use anyhow::Result;
use anyhow::bail;
use app::App;
use srs_sm2::Srs;
use srs_sm2::clock::UtcClock;
use std::env;
use std::path::PathBuf;

const HELP: &str = "\
Spaced repetition flashcards

USAGE:
  srs [OPTIONS] <COMMAND>

COMMANDS:
  init                       Create the database tables
  create-deck <NAME>         Create a deck
  decks                      List decks
  delete-deck <DECK_ID>      Delete a deck and its cards
  add <DECK_ID> <FRONT> <BACK>
                             Add a card to a deck
  cards                      List cards and when they're next due
  delete <CARD_ID>           Delete a card
  due [DECK_ID]              Count cards due for review
  review [DECK_ID]           Review due cards
  reset <CARD_ID>            Make a card new again
  stats                      Show review statistics

OPTIONS:
  -p, --path <PATH>          Database file [env: SRS_DB] [default: srs.db]
  -l, --learner <NAME>       Whose schedule to use [env: SRS_LEARNER] [default: default]
  -h, --help                 Print help
";

const DEFAULT_PATH: &str = "srs.db";
const DEFAULT_LEARNER: &str = "default";

#[derive(Debug)]
struct Args {
    path: PathBuf,
    learner: String,
    command: Command,
}

#[derive(Debug)]
enum Command {
    Add {
        deck_id: u64,
        front: String,
        back: String,
    },
    Cards,
    CreateDeck {
        name: String,
    },
    Decks,
    Delete {
        card_id: u64,
    },
    DeleteDeck {
        deck_id: u64,
    },
    Due {
        deck_id: Option<u64>,
    },
    Init,
    Reset {
        card_id: u64,
    },
    Review {
        deck_id: Option<u64>,
    },
    Stats,
}

fn main() -> Result<()> {
    env_logger::init();

    let Some(args) = parse_args()? else {
        print!("{HELP}");
        return Ok(());
    };

    log::debug!("{args:?}");

    let srs = Srs::open(&args.path)?;
    let mut app = App::new(srs, args.learner, UtcClock);

    match args.command {
        Command::Add {
            deck_id,
            front,
            back,
        } => app.add(deck_id, &front, &back),
        Command::Cards => app.cards(),
        Command::CreateDeck { name } => app.create_deck(&name),
        Command::Decks => app.decks(),
        Command::Delete { card_id } => app.delete(card_id),
        Command::DeleteDeck { deck_id } => app.delete_deck(deck_id),
        Command::Due { deck_id } => app.due(deck_id),
        Command::Init => app.init(),
        Command::Reset { card_id } => app.reset(card_id),
        Command::Review { deck_id } => app.review(deck_id),
        Command::Stats => app.stats(),
    }
}

/// Returns `None` when help was requested.
fn parse_args() -> Result<Option<Args>> {
    let mut pargs = pico_args::Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let path = match pargs.opt_value_from_str(["-p", "--path"])? {
        Some(path) => path,
        None => env::var_os("SRS_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PATH)),
    };

    let learner = match pargs.opt_value_from_str(["-l", "--learner"])? {
        Some(learner) => learner,
        None => env::var("SRS_LEARNER").unwrap_or_else(|_| DEFAULT_LEARNER.to_string()),
    };

    if learner.is_empty() {
        bail!("learner can't be empty");
    }

    let Some(subcommand) = pargs.subcommand()? else {
        return Ok(None);
    };

    let command = match subcommand.as_str() {
        "add" => Command::Add {
            deck_id: pargs.free_from_str()?,
            front: pargs.free_from_str()?,
            back: pargs.free_from_str()?,
        },
        "cards" => Command::Cards,
        "create-deck" => Command::CreateDeck {
            name: pargs.free_from_str()?,
        },
        "decks" => Command::Decks,
        "delete" => Command::Delete {
            card_id: pargs.free_from_str()?,
        },
        "delete-deck" => Command::DeleteDeck {
            deck_id: pargs.free_from_str()?,
        },
        "due" => Command::Due {
            deck_id: pargs.opt_free_from_str()?,
        },
        "init" => Command::Init,
        "reset" => Command::Reset {
            card_id: pargs.free_from_str()?,
        },
        "review" => Command::Review {
            deck_id: pargs.opt_free_from_str()?,
        },
        "stats" => Command::Stats,
        other => bail!("unknown command '{other}', see --help"),
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        bail!("unexpected arguments: {remaining:?}");
    }

    Ok(Some(Args {
        path,
        learner,
        command,
    }))
}
