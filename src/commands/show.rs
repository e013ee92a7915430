use crate::cli::IdArgs;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::profile::Profile;
use crate::store::ProfileStore;

use super::{summary_line, visible_to};

pub fn run(ctx: &AppContext, args: IdArgs) -> AppResult<()> {
    let owner = ctx.owner()?;
    let collection = ctx.store.load()?;
    let profile = visible_to(collection.get(args.id)?, &owner)?;

    ctx.output.emit_lines(&detail_lines(profile), profile)
}

fn detail_lines(profile: &Profile) -> Vec<String> {
    let mut lines = vec![summary_line(profile), format!("owner: {}", profile.owner)];

    if !profile.description.is_empty() {
        lines.push(format!("description: {}", profile.description));
    }
    if !profile.shared_with.is_empty() {
        let users = profile.shared_with.iter().cloned().collect::<Vec<_>>();
        lines.push(format!("shared with: {}", users.join(", ")));
    }
    if let Some(check) = &profile.login_check {
        lines.push(format!("login check: {} =~ /{}/", check.url, check.pattern));
    }

    push_map(&mut lines, "redundant", profile.redundant.iter());
    push_map(&mut lines, "cookies", profile.cookies.iter());
    push_map(&mut lines, "custom headers", profile.custom_headers.iter());
    push_list(&mut lines, "plugins", profile.plugins.keys());
    push_list(&mut lines, "modules", profile.modules.iter());
    push_list(&mut lines, "exclude", profile.exclude.iter());
    push_list(&mut lines, "include", profile.include.iter());
    push_list(&mut lines, "restrict paths", profile.restrict_paths.iter());
    push_list(&mut lines, "extend paths", profile.extend_paths.iter());
    push_list(&mut lines, "exclude vectors", profile.exclude_vectors.iter());
    push_list(&mut lines, "exclude cookies", profile.exclude_cookies.iter());

    lines
}

fn push_map<K, V>(lines: &mut Vec<String>, label: &str, entries: impl Iterator<Item = (K, V)>)
where
    K: std::fmt::Display,
    V: std::fmt::Display,
{
    let entries = entries
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>();
    if !entries.is_empty() {
        lines.push(format!("{label}: {}", entries.join(", ")));
    }
}

fn push_list<T: std::fmt::Display>(
    lines: &mut Vec<String>,
    label: &str,
    items: impl Iterator<Item = T>,
) {
    let items = items.map(|item| item.to_string()).collect::<Vec<_>>();
    if !items.is_empty() {
        lines.push(format!("{label}: {}", items.join(", ")));
    }
}
