use serde::{Deserialize, Serialize};

use crate::cli::DraftArgs;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::profile::{ProfileDraft, ValidationErrors, Validator};
use crate::store::ProfileStore;

use super::{error_lines, read_json, summary_line};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DraftBatch {
    Many(Vec<ProfileDraft>),
    One(Box<ProfileDraft>),
}

impl DraftBatch {
    fn into_drafts(self) -> Vec<ProfileDraft> {
        match self {
            Self::Many(drafts) => drafts,
            Self::One(draft) => vec![*draft],
        }
    }
}

#[derive(Debug, Serialize)]
struct RejectedDraft {
    position: usize,
    name: String,
    errors: ValidationErrors,
}

/// All drafts are validated against the store and against each other; a
/// single invalid draft leaves the store untouched.
pub async fn run(ctx: &AppContext, args: DraftArgs) -> AppResult<()> {
    let owner = ctx.owner()?;
    let drafts = read_json::<DraftBatch>(&args.file)?.into_drafts();
    if drafts.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "{} contains no profile drafts",
            args.file.display()
        )));
    }

    let total = drafts.len();
    let catalog = ctx.registry().await?;

    let imported = ctx.store.transaction(|profiles| {
        let mut imported = Vec::new();
        let mut rejected = Vec::new();

        for (index, mut draft) in drafts.into_iter().enumerate() {
            draft.id = None;
            draft.owner = owner.clone();
            draft.default = false;

            match Validator::new(&catalog, &*profiles).validate(&draft) {
                Ok(profile) => imported.push(profiles.insert(profile)?),
                Err(errors) => rejected.push(RejectedDraft {
                    position: index + 1,
                    name: draft.name,
                    errors,
                }),
            }
        }

        if !rejected.is_empty() {
            let mut lines = Vec::new();
            for draft in &rejected {
                lines.push(format!("draft {} ({}):", draft.position, draft.name));
                lines.extend(error_lines(&draft.errors));
            }
            ctx.output.emit_lines(&lines, &rejected)?;

            return Err(AppError::InvalidInput(format!(
                "{} of {total} drafts are invalid; nothing imported",
                rejected.len()
            )));
        }

        Ok(imported)
    })?;

    let mut lines = vec![format!("imported {} profiles", imported.len())];
    lines.extend(imported.iter().map(|profile| format!("  {}", summary_line(profile))));
    ctx.output.emit_lines(&lines, &imported)
}
