//! Pre-bundling checks on a request and one of its resolved artifacts.
//!
//! Everything here runs before a single byte is written for the artifact, so a
//! rejected request leaves the staging directory untouched.

use crate::bundler::naming;
use crate::error::{P2SiteError, Result};
use crate::models::{ArtifactRequest, OsgiVersion};
use crate::resolver::ResolvedArtifact;
use std::str::FromStr;

pub fn validate(request: &ArtifactRequest, artifact: &ResolvedArtifact) -> Result<()> {
    let instructions = &request.instructions;

    if request.source && !instructions.embed_source && !instructions.source_bundle {
        return Err(P2SiteError::Validation(format!(
            "{}: source requested but both 'embed_source' and 'source_bundle' are disabled, \
             the source would be dropped",
            request.id
        )));
    }

    if instructions.embed_source && instructions.source_bundle {
        return Err(P2SiteError::Validation(format!(
            "{}: 'embed_source' and 'source_bundle' cannot both be enabled",
            request.id
        )));
    }

    if let Some(name) = &instructions.symbolic_name {
        if !naming::is_valid_symbolic_name(name) {
            return Err(P2SiteError::Validation(format!(
                "{}: '{name}' is not a valid symbolic name",
                request.id
            )));
        }
    }

    let override_version = match &instructions.version {
        Some(version) => Some(OsgiVersion::from_str(version).map_err(|_| {
            P2SiteError::Validation(format!(
                "{}: '{version}' is not a valid bundle version",
                request.id
            ))
        })?),
        None => None,
    };

    // Only the root is renamed, so the only possible clash is the root's new
    // identity landing on a transitive member's computed one.
    if request.transitive && !artifact.root {
        if let Some(name) = &instructions.symbolic_name {
            let root_version = override_version
                .unwrap_or_else(|| OsgiVersion::from_maven(request.id.version()));
            let member = artifact.coordinate();
            if naming::symbolic_name(member) == *name
                && OsgiVersion::from_maven(member.version()) == root_version
            {
                return Err(P2SiteError::Validation(format!(
                    "{}: overridden bundle {name} {root_version} collides with dependency {member}",
                    request.id
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, Instructions};
    use crate::resolver::LocatedArtifact;
    use std::path::PathBuf;

    fn artifact(id: &str, root: bool) -> ResolvedArtifact {
        ResolvedArtifact {
            artifact: LocatedArtifact {
                coordinate: Coordinate::from_str(id).unwrap(),
                path: PathBuf::from("unused.jar"),
            },
            source: None,
            root,
        }
    }

    fn request(instructions: Instructions) -> ArtifactRequest {
        ArtifactRequest::new(Coordinate::from_str("org.example:lib:1.2.0").unwrap())
            .with_instructions(instructions)
    }

    fn rejected(request: &ArtifactRequest, artifact: &ResolvedArtifact) -> bool {
        matches!(validate(request, artifact), Err(P2SiteError::Validation(_)))
    }

    #[test]
    fn defaults_pass() {
        let root = artifact("org.example:lib:1.2.0", true);
        assert!(validate(&request(Instructions::default()).with_source(true), &root).is_ok());
    }

    #[test]
    fn source_with_nowhere_to_go_is_rejected() {
        let root = artifact("org.example:lib:1.2.0", true);
        let instructions = Instructions {
            source_bundle: false,
            ..Instructions::default()
        };
        assert!(rejected(&request(instructions.clone()).with_source(true), &root));
        assert!(validate(&request(instructions), &root).is_ok());
    }

    #[test]
    fn embed_and_source_bundle_conflict() {
        let root = artifact("org.example:lib:1.2.0", true);
        let instructions = Instructions {
            embed_source: true,
            source_bundle: true,
            ..Instructions::default()
        };
        assert!(rejected(&request(instructions), &root));
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let root = artifact("org.example:lib:1.2.0", true);
        let bad_name = Instructions {
            symbolic_name: Some("org..lib".to_string()),
            ..Instructions::default()
        };
        let bad_version = Instructions {
            version: Some("1.2.3-SNAPSHOT".to_string()),
            ..Instructions::default()
        };
        assert!(rejected(&request(bad_name), &root));
        assert!(rejected(&request(bad_version), &root));
    }

    #[test]
    fn override_colliding_with_member_is_rejected() {
        let instructions = Instructions {
            symbolic_name: Some("org.example.core".to_string()),
            ..Instructions::default()
        };
        let clash = artifact("org.example:core:1.2.0", false);
        let other_version = artifact("org.example:core:2.0.0", false);

        assert!(rejected(&request(instructions.clone()), &clash));
        assert!(validate(&request(instructions.clone()), &other_version).is_ok());
        assert!(validate(&request(instructions).with_transitive(false), &clash).is_ok());
    }
}
