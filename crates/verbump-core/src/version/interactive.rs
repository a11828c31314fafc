//! Interactive version mode.
//!
//! Computes a candidate for every release kind, asks the [`Prompter`] to
//! pick one, and resolves the pick (including "as-is" and free-form custom
//! versions) into the new version.

use semver::Version;
use tracing::{debug, instrument};

use crate::prompt::{Prompter, VersionChoice, VersionSelection};
use crate::release::ReleaseKind;
use crate::version::explicit::validate_explicit;
use crate::version::increment::{increment, resolve_next};
use crate::version::{VersionError, VersionResult, parse_version};

/// Order in which release kinds are offered.
const PICKER_ORDER: &[ReleaseKind] = &[
    ReleaseKind::Major,
    ReleaseKind::Minor,
    ReleaseKind::Patch,
    ReleaseKind::Next,
    ReleaseKind::Prepatch,
    ReleaseKind::Preminor,
    ReleaseKind::Premajor,
    ReleaseKind::Prerelease,
];

/// The prerelease identifier the candidates use.
///
/// A version that is already a prerelease keeps its own identifier
/// (`1.0.0-rc.2` offers `rc` candidates) regardless of `requested`.
pub fn effective_preid<'a>(current: &'a Version, requested: &'a str) -> &'a str {
    current
        .pre
        .as_str()
        .split('.')
        .next()
        .filter(|first| !first.is_empty() && !first.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(requested)
}

/// Compute every entry of the version picker, in display order.
///
/// Returns the entries and the index of the default (`next`).
pub fn version_choices(current: &Version, preid: &str) -> VersionResult<(Vec<VersionChoice>, usize)> {
    let preid = effective_preid(current, preid);

    let mut choices = Vec::with_capacity(PICKER_ORDER.len() + 2);
    for kind in PICKER_ORDER {
        let version = increment(current, *kind, preid)?;
        choices.push(VersionChoice {
            selection: VersionSelection::Kind(*kind),
            version: Some(version.to_string()),
        });
    }
    choices.push(VersionChoice {
        selection: VersionSelection::AsIs,
        version: Some(current.to_string()),
    });
    choices.push(VersionChoice {
        selection: VersionSelection::Custom,
        version: None,
    });

    let default = PICKER_ORDER
        .iter()
        .position(|kind| *kind == ReleaseKind::Next)
        .unwrap_or_default();
    Ok((choices, default))
}

/// Ask the user for the new version.
///
/// Returns the release kind applied (`None` for as-is and custom picks) and
/// the chosen version. Cancelling any prompt yields [`VersionError::Aborted`].
#[instrument(skip(prompter), fields(%current))]
pub fn prompt_for_version(
    current: &Version,
    preid: &str,
    prompter: &mut dyn Prompter,
) -> VersionResult<(Option<ReleaseKind>, Version)> {
    let current_str = current.to_string();
    let (choices, default) = version_choices(current, preid)?;

    let picked = prompter
        .select_version(&current_str, &choices, default)?
        .and_then(|index| choices.get(index))
        .ok_or(VersionError::Aborted)?;
    debug!(selection = picked.label(), "version selected");

    match picked.selection {
        VersionSelection::AsIs => Ok((None, current.clone())),
        VersionSelection::Custom => {
            let version = prompt_custom(&current_str, prompter)?;
            Ok((None, version))
        }
        VersionSelection::Kind(kind) => {
            let version = picked
                .version
                .as_deref()
                .ok_or(VersionError::Aborted)
                .and_then(parse_version)?;
            Ok((Some(resolve_next(current, kind)), version))
        }
    }
}

/// Keep asking until the answer is a valid version or the user cancels.
fn prompt_custom(current: &str, prompter: &mut dyn Prompter) -> VersionResult<Version> {
    let mut error: Option<String> = None;
    loop {
        let answer = prompter
            .custom_version(current, error.as_deref())?
            .ok_or(VersionError::Aborted)?;
        match validate_explicit(&answer) {
            Ok(version) => return Ok(version),
            Err(_) => {
                debug!(%answer, "rejected custom version");
                error = Some("That's not a valid version number".to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::prompt::scripted::ScriptedPrompter;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn index_of(choices: &[VersionChoice], selection: VersionSelection) -> usize {
        choices
            .iter()
            .position(|c| c.selection == selection)
            .unwrap()
    }

    #[test]
    fn choices_cover_every_kind_plus_as_is_and_custom() {
        let (choices, default) = version_choices(&v("1.2.3"), "beta").unwrap();
        assert_eq!(choices.len(), 10);
        assert_eq!(
            choices[default].selection,
            VersionSelection::Kind(ReleaseKind::Next)
        );
        let labels: Vec<_> = choices.iter().map(VersionChoice::label).collect();
        assert_eq!(
            labels,
            [
                "major",
                "minor",
                "patch",
                "next",
                "pre-patch",
                "pre-minor",
                "pre-major",
                "pre-release",
                "as-is",
                "custom ..."
            ]
        );
    }

    #[test]
    fn stable_candidates() {
        let (choices, _) = version_choices(&v("1.2.3"), "beta").unwrap();
        let version = |kind| {
            choices[index_of(&choices, VersionSelection::Kind(kind))]
                .version
                .clone()
                .unwrap()
        };
        assert_eq!(version(ReleaseKind::Major), "2.0.0");
        assert_eq!(version(ReleaseKind::Next), "1.2.4");
        assert_eq!(version(ReleaseKind::Premajor), "2.0.0-beta.0");
        assert_eq!(version(ReleaseKind::Prerelease), "1.2.4-beta.0");
    }

    #[test]
    fn prerelease_candidates_keep_existing_preid() {
        let (choices, _) = version_choices(&v("1.2.4-rc.1"), "beta").unwrap();
        let next = &choices[index_of(&choices, VersionSelection::Kind(ReleaseKind::Next))];
        assert_eq!(next.version.as_deref(), Some("1.2.4-rc.2"));
        let premajor =
            &choices[index_of(&choices, VersionSelection::Kind(ReleaseKind::Premajor))];
        assert_eq!(premajor.version.as_deref(), Some("2.0.0-rc.0"));
    }

    #[test]
    fn numeric_prerelease_uses_requested_preid() {
        assert_eq!(effective_preid(&v("1.0.0-0"), "beta"), "beta");
        assert_eq!(effective_preid(&v("1.0.0"), "alpha"), "alpha");
        assert_eq!(effective_preid(&v("1.0.0-rc.1"), "alpha"), "rc");
    }

    #[test]
    fn picking_a_kind_records_it() {
        let mut prompter = ScriptedPrompter::selecting(1);
        let (kind, version) = prompt_for_version(&v("1.2.3"), "beta", &mut prompter).unwrap();
        assert_eq!(kind, Some(ReleaseKind::Minor));
        assert_eq!(version, v("1.3.0"));
        assert_eq!(prompter.seen_default, Some(3));
    }

    #[test]
    fn picking_next_records_resolved_kind() {
        let mut prompter = ScriptedPrompter::selecting(3);
        let (kind, version) = prompt_for_version(&v("1.2.3"), "beta", &mut prompter).unwrap();
        assert_eq!(kind, Some(ReleaseKind::Patch));
        assert_eq!(version, v("1.2.4"));
    }

    #[test]
    fn as_is_keeps_current() {
        let mut prompter = ScriptedPrompter::selecting(8);
        let (kind, version) = prompt_for_version(&v("1.2.3"), "beta", &mut prompter).unwrap();
        assert_eq!(kind, None);
        assert_eq!(version, v("1.2.3"));
    }

    #[test]
    fn custom_reprompts_until_valid() {
        let mut prompter = ScriptedPrompter::selecting(9);
        prompter.customs = VecDeque::from([Some("nope".to_string()), Some("v3.0.0".to_string())]);
        let (kind, version) = prompt_for_version(&v("1.2.3"), "beta", &mut prompter).unwrap();
        assert_eq!(kind, None);
        assert_eq!(version, v("3.0.0"));
        assert_eq!(prompter.seen_errors.len(), 1);
    }

    #[test]
    fn custom_version_drops_build_metadata() {
        let mut prompter = ScriptedPrompter::selecting(9);
        prompter.customs = VecDeque::from([Some("4.0.0+sha.abc".to_string())]);
        let (_, version) = prompt_for_version(&v("1.2.3"), "beta", &mut prompter).unwrap();
        assert_eq!(version.to_string(), "4.0.0");
    }

    #[test]
    fn cancelled_selection_aborts() {
        let mut prompter = ScriptedPrompter {
            selections: VecDeque::from([None]),
            ..ScriptedPrompter::default()
        };
        let err = prompt_for_version(&v("1.2.3"), "beta", &mut prompter).unwrap_err();
        assert!(matches!(err, VersionError::Aborted));
    }

    #[test]
    fn out_of_range_selection_aborts() {
        let mut prompter = ScriptedPrompter::selecting(42);
        let err = prompt_for_version(&v("1.2.3"), "beta", &mut prompter).unwrap_err();
        assert!(matches!(err, VersionError::Aborted));
    }

    #[test]
    fn cancelled_custom_aborts() {
        let mut prompter = ScriptedPrompter::selecting(9);
        prompter.customs = VecDeque::from([None]);
        let err = prompt_for_version(&v("1.2.3"), "beta", &mut prompter).unwrap_err();
        assert!(matches!(err, VersionError::Aborted));
    }
}
