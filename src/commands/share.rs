use crate::cli::ShareArgs;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::store::ProfileStore;

use super::owned_by;

pub fn run(ctx: &AppContext, args: ShareArgs) -> AppResult<()> {
    let owner = ctx.owner()?;
    let profile = ctx.store.transaction(|profiles| {
        owned_by(profiles.get(args.id)?, &owner)?;
        profiles.share(args.id, &args.users)
    })?;

    let users = profile.shared_with.iter().cloned().collect::<Vec<_>>();
    let text = format!("#{} {} is shared with {}", profile.id, profile.name, users.join(", "));
    ctx.output.emit(&text, &profile)
}
