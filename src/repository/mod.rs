//! On-disk format of a published repository and the code that produces it.

pub mod generator;
pub mod index;

pub use generator::{CategorySummary, GeneratorConfig, PublishSummary, RepositoryGenerator};
pub use index::{
    ArtifactEntry, ArtifactIndex, CategoryDefinition, CategorySpec, CategoryUnit, InstallableUnit,
    MetadataIndex, PackageCapability, UnitRef,
};

/// Category file installed when the user does not supply one.
pub const DEFAULT_CATEGORY: &str = include_str!("../../resources/category.toml");
pub const DEFAULT_CATEGORY_FILE: &str = "category.toml";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_category_matches_everything() {
        let definition: CategoryDefinition = toml::from_str(DEFAULT_CATEGORY).unwrap();
        assert_eq!(definition.categories.len(), 1);
        assert_eq!(definition.categories[0].id, "default");
        assert_eq!(definition.categories[0].members, vec!["*"]);
    }
}
