//! Shared utilities for CLI commands

use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::identity::{RecordId, RECORD_PREFIX};
use crate::core::project::Project;
use crate::core::shortid::{is_short_reference, ShortIdIndex};
use crate::core::store::{open_store, RecordStore};
use crate::core::Config;
use crate::entities::PaintCan;

/// Project and its effective configuration, loaded once per command
pub struct Workspace {
    pub project: Project,
    pub config: Config,
}

impl Workspace {
    /// Locate the project (honoring `--project`) and load its configuration
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let project =
            Project::locate(global.project.as_deref()).map_err(|e| miette::miette!("{}", e))?;
        let config = Config::load(Some(&project))?;
        tracing::debug!(
            root = %project.root().display(),
            store = %config.store_backend(),
            color_mode = %config.color_mode(),
            "workspace opened"
        );
        Ok(Self { project, config })
    }

    /// Open the configured store backend
    pub fn store(&self) -> Result<Box<dyn RecordStore>> {
        Ok(open_store(&self.project, self.config.store_backend())?)
    }
}

/// Find the can a user reference points at
///
/// Accepts, in order: a short reference (`@N` / `N`) from the last listing,
/// a full id, a unique id prefix, or a unique case-insensitive name.
pub fn resolve_reference<'a>(
    cans: &'a [PaintCan],
    short_ids: &ShortIdIndex,
    reference: &str,
) -> Result<&'a PaintCan> {
    let reference = reference.trim();

    if is_short_reference(reference) {
        let id = short_ids.resolve(reference).ok_or_else(|| {
            miette::miette!(
                "Unknown short reference '{}'. Run 'botes paint list' to refresh short references.",
                reference
            )
        })?;
        return cans
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| miette::miette!("Paint can {} no longer exists", id));
    }

    if let Ok(id) = reference.parse::<RecordId>() {
        if let Some(can) = cans.iter().find(|c| c.id == id) {
            return Ok(can);
        }
    }

    let upper = reference.to_uppercase();
    let ulid_prefix = upper
        .strip_prefix(&format!("{}-", RECORD_PREFIX))
        .unwrap_or(&upper);
    if looks_like_ulid_prefix(ulid_prefix) {
        let by_prefix: Vec<&PaintCan> = cans
            .iter()
            .filter(|c| c.id.ulid().to_string().starts_with(ulid_prefix))
            .collect();
        if let Some(can) = single(by_prefix, reference)? {
            return Ok(can);
        }
    }

    let needle = reference.to_lowercase();
    let by_name: Vec<&PaintCan> = cans
        .iter()
        .filter(|c| c.paint.name.trim().to_lowercase() == needle)
        .collect();
    if let Some(can) = single(by_name, reference)? {
        return Ok(can);
    }

    Err(miette::miette!("No paint can found matching '{}'", reference))
}

/// ULIDs start with a digit and use only alphanumerics
fn looks_like_ulid_prefix(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_digit()) && s.chars().all(|c| c.is_ascii_alphanumeric())
}

fn single<'a>(matches: Vec<&'a PaintCan>, reference: &str) -> Result<Option<&'a PaintCan>> {
    match matches.as_slice() {
        [] => Ok(None),
        [can] => Ok(Some(*can)),
        many => {
            let ids: Vec<String> = many.iter().map(|c| c.id.to_string()).collect();
            Err(miette::miette!(
                "'{}' matches {} paint cans: {}",
                reference,
                many.len(),
                ids.join(", ")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::ColorHex;
    use crate::entities::Paint;

    fn cans() -> Vec<PaintCan> {
        ["Blanco", "Negro", "negro"]
            .iter()
            .map(|name| PaintCan::new(RecordId::new(), Paint::new(*name, "X", ColorHex::NEUTRAL)))
            .collect()
    }

    #[test]
    fn test_resolve_by_full_id_and_prefix() {
        let cans = cans();
        let id = cans[1].id.to_string();
        let index = ShortIdIndex::new();

        assert_eq!(resolve_reference(&cans, &index, &id).unwrap().id, cans[1].id);
        assert_eq!(
            resolve_reference(&cans, &index, &id.to_lowercase()).unwrap().id,
            cans[1].id
        );
        // The whole ULID is a unique prefix of itself
        let ulid = cans[2].id.ulid().to_string();
        assert_eq!(resolve_reference(&cans, &index, &ulid).unwrap().id, cans[2].id);

        let fixed = ulid::Ulid::from_string("01ARZ3NDEKTSV4RRFFQ69G5FAV").unwrap();
        let mut cans = cans;
        cans.push(PaintCan::new(
            RecordId::from_ulid(fixed),
            Paint::new("Azul", "AZUL", ColorHex::NEUTRAL),
        ));
        let found = resolve_reference(&cans, &index, "bote-01arz3").unwrap();
        assert_eq!(found.paint.name, "Azul");
    }

    #[test]
    fn test_resolve_by_short_reference() {
        let cans = cans();
        let mut index = ShortIdIndex::new();
        index.rebuild(cans.iter().rev().map(|c| c.id));

        assert_eq!(resolve_reference(&cans, &index, "@1").unwrap().id, cans[2].id);
        assert_eq!(resolve_reference(&cans, &index, "3").unwrap().id, cans[0].id);
        assert!(resolve_reference(&cans, &index, "@9").is_err());
    }

    #[test]
    fn test_resolve_by_name() {
        let cans = cans();
        let index = ShortIdIndex::new();

        assert_eq!(resolve_reference(&cans, &index, "BLANCO").unwrap().id, cans[0].id);
        let err = resolve_reference(&cans, &index, "Negro").unwrap_err();
        assert!(err.to_string().contains("matches 2 paint cans"));
        assert!(resolve_reference(&cans, &index, "Azul").is_err());
    }
}
