use crate::cli::IdArgs;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::store::ProfileStore;

use super::owned_by;

pub fn run(ctx: &AppContext, args: IdArgs) -> AppResult<()> {
    let owner = ctx.owner()?;
    let profile = ctx.store.transaction(|profiles| {
        owned_by(profiles.get(args.id)?, &owner)?;
        profiles.make_default(args.id)
    })?;

    let text = format!("#{} {} is now the default profile", profile.id, profile.name);
    ctx.output.emit(&text, &profile)
}
