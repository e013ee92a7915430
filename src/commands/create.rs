use crate::cli::CreateArgs;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::profile::{ProfileDraft, Validator};
use crate::store::ProfileStore;

use super::{read_json, validated};

pub async fn run(ctx: &AppContext, args: CreateArgs) -> AppResult<()> {
    let owner = ctx.owner()?;
    let from_file = args
        .file
        .as_deref()
        .map(read_json::<ProfileDraft>)
        .transpose()?;
    let catalog = ctx.registry().await?;

    let profile = ctx.store.transaction(|profiles| {
        let mut draft = match from_file {
            Some(draft) => draft,
            None => {
                let template = profiles.default_profile().ok_or_else(|| {
                    AppError::NotFound(
                        "default profile. run `scan-profiles make-default <id>` first".to_string(),
                    )
                })?;
                ProfileDraft::from_template(template, &owner, &template.name)
            }
        };

        draft.id = None;
        draft.owner = owner.clone();
        draft.default = false;
        if let Some(name) = args.name {
            draft.name = name;
        }

        let profile = validated(ctx, Validator::new(&catalog, &*profiles).validate(&draft))?;
        profiles.insert(profile)
    })?;

    let text = format!("created profile #{} {}", profile.id, profile.name);
    ctx.output.emit(&text, &profile)
}
