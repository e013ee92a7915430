use crate::cli::{Cli, Command};
use crate::commands;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::logging;

pub async fn run(cli: Cli) -> AppResult<()> {
    let Cli {
        owner,
        registry,
        json,
        verbose,
        command,
    } = cli;

    logging::init(verbose);
    let ctx = AppContext::bootstrap(owner, registry, json)?;

    match command {
        Command::Validate(args) => commands::validate::run(&ctx, args).await,
        Command::Create(args) => commands::create::run(&ctx, args).await,
        Command::Update(args) => commands::update::run(&ctx, args).await,
        Command::List(args) => commands::list::run(&ctx, args),
        Command::Show(args) => commands::show::run(&ctx, args),
        Command::Delete(args) => commands::delete::run(&ctx, args),
        Command::Copy(args) => commands::copy::run(&ctx, args).await,
        Command::Import(args) => commands::import::run(&ctx, args).await,
        Command::MakeDefault(args) => commands::default::run(&ctx, args),
        Command::Share(args) => commands::share::run(&ctx, args),
        Command::Registry => commands::registry::run(&ctx).await,
        Command::Config(args) => commands::config::run(&ctx, args),
    }
}
