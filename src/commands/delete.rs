use crate::cli::IdArgs;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::store::ProfileStore;

use super::owned_by;

pub fn run(ctx: &AppContext, args: IdArgs) -> AppResult<()> {
    let owner = ctx.owner()?;
    let removed = ctx.store.transaction(|profiles| {
        owned_by(profiles.get(args.id)?, &owner)?;
        profiles.remove(args.id)
    })?;

    let text = format!("deleted profile #{} {}", removed.id, removed.name);
    ctx.output.emit(&text, &removed)
}
