//! Entity catalog: tables, filter allow-lists and relations known to the API.
//!
//! Every list endpoint narrows a query rooted at one of these entities, and
//! the eager-load expander walks the relation tables declared here.

pub mod actor;
pub mod catalog;
pub mod invoice;
pub mod jobcard;

pub use actor::Actor;

use serde_json::{Map, Value};

/// A single database row rendered as JSON (`to_jsonb`)
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    User,
    Company,
    CompanyBranch,
    Jobcard,
    Invoice,
    FormTemplate,
    FormAllocation,
    Phone,
    Category,
}

impl Entity {
    pub fn def(self) -> &'static EntityDef {
        match self {
            Entity::User => &catalog::USER,
            Entity::Company => &catalog::COMPANY,
            Entity::CompanyBranch => &catalog::COMPANY_BRANCH,
            Entity::Jobcard => &catalog::JOBCARD,
            Entity::Invoice => &catalog::INVOICE,
            Entity::FormTemplate => &catalog::FORM_TEMPLATE,
            Entity::FormAllocation => &catalog::FORM_ALLOCATION,
            Entity::Phone => &catalog::PHONE,
            Entity::Category => &catalog::CATEGORY,
        }
    }

    pub fn table(self) -> &'static str {
        self.def().table
    }

    /// Value stored in `*_type` columns of polymorphic tables
    pub fn morph_type(self) -> &'static str {
        self.def().morph_type
    }
}

/// How a relation is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// `parent.<foreign_key>` references `target.id`
    BelongsTo { foreign_key: &'static str },
    /// `target.<foreign_key>` references `parent.id`
    HasMany { foreign_key: &'static str },
    /// Linked through a pivot table holding both keys
    BelongsToMany {
        pivot: &'static str,
        parent_key: &'static str,
        related_key: &'static str,
    },
    /// `target.trackable_type = parent morph type AND target.trackable_id = parent.id`
    MorphMany,
}

#[derive(Debug, Clone, Copy)]
pub struct RelationDef {
    pub name: &'static str,
    pub target: Entity,
    pub kind: RelationKind,
}

impl RelationDef {
    /// BelongsTo yields a single object (or null); everything else a list
    pub fn is_single(&self) -> bool {
        matches!(self.kind, RelationKind::BelongsTo { .. })
    }
}

#[derive(Debug)]
pub struct EntityDef {
    pub table: &'static str,
    pub morph_type: &'static str,
    pub soft_deletes: bool,
    pub allowed_filters: &'static [&'static str],
    pub orderable: &'static [&'static str],
    pub relations: &'static [RelationDef],
    /// Columns stripped from every rendered row
    pub hidden: &'static [&'static str],
}

impl EntityDef {
    pub fn allows_filter(&self, column: &str) -> bool {
        self.allowed_filters.contains(&column)
    }

    pub fn allows_order(&self, column: &str) -> bool {
        self.orderable.contains(&column)
    }

    pub fn relation(&self, name: &str) -> Option<&'static RelationDef> {
        self.relations.iter().find(|r| r.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_lookup_is_by_exact_name() {
        let jobcard = Entity::Jobcard.def();
        assert!(jobcard.relation("contractorsList").is_some());
        assert!(jobcard.relation("contractorslist").is_none());
        assert!(jobcard.relation("client").map(|r| r.is_single()).unwrap_or(false));
    }

    #[test]
    fn every_relation_target_has_a_table() {
        for entity in [
            Entity::User,
            Entity::Company,
            Entity::CompanyBranch,
            Entity::Jobcard,
            Entity::Invoice,
            Entity::FormTemplate,
            Entity::FormAllocation,
            Entity::Phone,
            Entity::Category,
        ] {
            for relation in entity.def().relations {
                assert!(!relation.target.table().is_empty());
            }
        }
    }

    #[test]
    fn users_hide_password_from_filters() {
        // password is fillable on users but must never be filterable
        assert!(!Entity::User.def().allows_filter("password"));
        assert!(Entity::User.def().allows_filter("first_name"));
    }

    #[test]
    fn only_users_hide_credentials() {
        assert_eq!(Entity::User.def().hidden, &["password", "remember_token"]);
        assert!(Entity::Jobcard.def().hidden.is_empty());
    }
}
