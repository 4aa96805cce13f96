//! Maps an actor plus a request's scope selector onto a root query.
//!
//! Every mapping is an exhaustive match, so an unmapped combination can
//! only ever resolve to the empty scope.

use serde_json::Value;
use tracing::warn;

use crate::entity::{Actor, Entity, RelationDef, RelationKind};

use super::query::{ColumnRef, Join, Predicate, QuerySpec, ScopeRoot, Selection};
use super::types::{
    Association, DirectoryKind, DirectorySelector, InvoiceModel, InvoiceSelector, JobcardModel, JobcardSelector,
    ScopeError,
};

pub const DIRECTORY_TABLE: &str = "company_directory";
pub const JOBCARD_CONTRACTORS_TABLE: &str = "jobcard_contractors";

fn require_branch(actor: &Actor) -> Result<i64, ScopeError> {
    actor.company_branch_id.ok_or(ScopeError::ActorWithoutBranch)
}

fn require_company(actor: &Actor) -> Result<i64, ScopeError> {
    require_branch(actor)?;
    actor.company_id.ok_or(ScopeError::ActorWithoutCompany)
}

// TODO: gate unrestricted scopes on the actor's access level once roles are modelled
fn unrestricted(entity: Entity, actor: &Actor) -> QuerySpec {
    warn!(actor_id = actor.id, access = %actor.access, table = entity.table(), "Unrestricted scope requested");
    QuerySpec::unrestricted(entity)
}

/// Resolve `GET /api/directory`
pub fn resolve_directory(actor: &Actor, selector: &DirectorySelector) -> Result<QuerySpec, ScopeError> {
    let entity = match selector.kind {
        DirectoryKind::Company => Entity::Company,
        DirectoryKind::User => Entity::User,
        DirectoryKind::Unmapped => return Ok(QuerySpec::empty(Entity::Company)),
    };

    let (owner_type, owner_id, root) = match selector.association {
        Association::Company => {
            let id = require_company(actor)?;
            (Entity::Company.morph_type(), id, ScopeRoot::Company(id))
        }
        Association::Branch => {
            let id = require_branch(actor)?;
            (Entity::CompanyBranch.morph_type(), id, ScopeRoot::Branch(id))
        }
        Association::All => return Ok(unrestricted(entity, actor)),
        Association::Unmapped => return Ok(QuerySpec::empty(entity)),
    };

    let mut conditions = vec![
        Predicate::eq(DIRECTORY_TABLE, "owner_type", owner_type),
        Predicate::eq(DIRECTORY_TABLE, "owner_id", owner_id),
        Predicate::eq(DIRECTORY_TABLE, "listing_type", entity.morph_type()),
    ];
    if let Some(listing_type) = selector.listing_type.as_str() {
        conditions.push(Predicate::eq(DIRECTORY_TABLE, "type", listing_type));
    }

    Ok(QuerySpec::new(entity, root)
        .with_join(Join {
            table: DIRECTORY_TABLE.to_string(),
            left: ColumnRef::new(DIRECTORY_TABLE, "listing_id"),
            right: ColumnRef::new(entity.table(), "id"),
            conditions,
        })
        .with_selection(Selection::RowWithPivot {
            pivot: DIRECTORY_TABLE.to_string(),
            keys: ["owner_type", "owner_id", "listing_type", "listing_id", "type"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }))
}

/// Resolve `GET /api/jobcards` without the lifecycle step (see [`apply_step`])
pub fn resolve_jobcards(actor: &Actor, selector: &JobcardSelector) -> Result<QuerySpec, ScopeError> {
    let table = Entity::Jobcard.table();
    Ok(match selector.model {
        JobcardModel::Company => {
            let id = require_company(actor)?;
            QuerySpec::new(Entity::Jobcard, ScopeRoot::Company(id)).with_predicate(Predicate::eq(table, "company_id", id))
        }
        JobcardModel::Branch => {
            let id = require_branch(actor)?;
            QuerySpec::new(Entity::Jobcard, ScopeRoot::Branch(id))
                .with_predicate(Predicate::eq(table, "company_branch_id", id))
        }
        JobcardModel::Client => {
            let id = selector.model_id.ok_or(ScopeError::MissingModelId("client"))?;
            QuerySpec::new(Entity::Jobcard, ScopeRoot::Client(id)).with_predicate(Predicate::eq(table, "client_id", id))
        }
        JobcardModel::Contractor => {
            let id = selector.model_id.ok_or(ScopeError::MissingModelId("contractor"))?;
            QuerySpec::new(Entity::Jobcard, ScopeRoot::Contractor(id)).with_predicate(Predicate::Exists {
                table: JOBCARD_CONTRACTORS_TABLE.to_string(),
                inner: ColumnRef::new(JOBCARD_CONTRACTORS_TABLE, "jobcard_id"),
                outer: ColumnRef::new(table, "id"),
                conditions: vec![Predicate::eq(JOBCARD_CONTRACTORS_TABLE, "contractor_id", id)],
            })
        }
        JobcardModel::All => unrestricted(Entity::Jobcard, actor),
        JobcardModel::Unmapped => QuerySpec::empty(Entity::Jobcard),
    })
}

/// Restrict jobcards to those whose lifecycle under `template_id` is at `step`.
///
/// Layered on top of the resolved root. An empty root is widened to all
/// jobcards first so a step can still be listed on its own.
pub fn apply_step(spec: QuerySpec, template_id: i64, step: &str) -> QuerySpec {
    let spec = if spec.is_empty_scope() {
        QuerySpec::unrestricted(Entity::Jobcard)
    } else {
        spec
    };
    let allocations = Entity::FormAllocation.table();
    spec.with_predicate(Predicate::Exists {
        table: allocations.to_string(),
        inner: ColumnRef::new(allocations, "trackable_id"),
        outer: ColumnRef::new(Entity::Jobcard.table(), "id"),
        conditions: vec![
            Predicate::eq(allocations, "trackable_type", Entity::Jobcard.morph_type()),
            Predicate::eq(allocations, "step", step),
            Predicate::eq(allocations, "form_template_id", template_id),
        ],
    })
}

/// Resolve `GET /api/invoices`
pub fn resolve_invoices(actor: &Actor, selector: &InvoiceSelector) -> Result<QuerySpec, ScopeError> {
    let table = Entity::Invoice.table();
    Ok(match selector.model {
        InvoiceModel::Company => {
            let id = require_company(actor)?;
            QuerySpec::new(Entity::Invoice, ScopeRoot::Company(id)).with_predicate(Predicate::eq(table, "company_id", id))
        }
        InvoiceModel::Branch => {
            let id = require_branch(actor)?;
            QuerySpec::new(Entity::Invoice, ScopeRoot::Branch(id))
                .with_predicate(Predicate::eq(table, "company_branch_id", id))
        }
        InvoiceModel::All => unrestricted(Entity::Invoice, actor),
        InvoiceModel::Unmapped => QuerySpec::empty(Entity::Invoice),
    })
}

/// Rows of `relation.target` linked to any of the given parent keys.
///
/// `keys` are parent ids, except for BelongsTo where they are the parent's
/// foreign key values.
pub fn relation_spec(parent: Entity, relation: &RelationDef, keys: Vec<Value>) -> QuerySpec {
    let target = relation.target;
    let table = target.table();
    let spec = QuerySpec::new(target, ScopeRoot::Related);
    match relation.kind {
        RelationKind::BelongsTo { .. } => spec.with_predicate(Predicate::In {
            column: ColumnRef::new(table, "id"),
            values: keys,
        }),
        RelationKind::HasMany { foreign_key } => spec.with_predicate(Predicate::In {
            column: ColumnRef::new(table, foreign_key),
            values: keys,
        }),
        RelationKind::BelongsToMany { pivot, parent_key, related_key } => spec
            .with_join(Join {
                table: pivot.to_string(),
                left: ColumnRef::new(pivot, related_key),
                right: ColumnRef::new(table, "id"),
                conditions: vec![Predicate::In { column: ColumnRef::new(pivot, parent_key), values: keys }],
            })
            .with_selection(Selection::RowWithPivot {
                pivot: pivot.to_string(),
                keys: vec![parent_key.to_string(), related_key.to_string()],
            }),
        RelationKind::MorphMany => spec
            .with_predicate(Predicate::eq(table, "trackable_type", parent.morph_type()))
            .with_predicate(Predicate::In {
                column: ColumnRef::new(table, "trackable_id"),
                values: keys,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SqlParams;
    use crate::scope::types::{parse_model_id, DirectoryType};

    fn actor() -> Actor {
        Actor::new(1, Some(3), Some(2))
    }

    fn directory(association: &str, kind: &str, listing: Option<&str>) -> QuerySpec {
        let selector = DirectorySelector {
            association: Association::parse(Some(association)),
            kind: DirectoryKind::parse(Some(kind)),
            listing_type: DirectoryType::parse(listing),
        };
        resolve_directory(&actor(), &selector).unwrap()
    }

    fn rendered_where(spec: &QuerySpec) -> (String, Vec<Value>) {
        let mut params = SqlParams::new();
        let mut parts = vec![spec.render_from(&mut params).unwrap()];
        parts.extend(spec.render_predicates(&mut params).unwrap());
        (parts.join(" "), params.into_values())
    }

    #[test]
    fn every_directory_combination_has_a_root() {
        for (association, root) in [("company", ScopeRoot::Company(2)), ("branch", ScopeRoot::Branch(3))] {
            for (kind, entity) in [("company", Entity::Company), ("user", Entity::User)] {
                for listing in [Some("client"), Some("supplier"), None] {
                    let spec = directory(association, kind, listing);
                    assert_eq!(spec.root(), root);
                    assert_eq!(spec.entity(), entity);
                    assert_eq!(spec.order_join(), entity.table());
                    let (sql, params) = rendered_where(&spec);
                    assert!(sql.contains("INNER JOIN \"company_directory\""));
                    assert_eq!(params.len(), if listing.is_some() { 4 } else { 3 });
                    if let Some(listing) = listing {
                        assert_eq!(params[3], Value::from(listing));
                    }
                }
            }
        }
        assert_eq!(directory("all", "company", None).root(), ScopeRoot::Unrestricted);
        assert_eq!(directory("all", "user", Some("client")).entity(), Entity::User);
        assert!(directory("region", "user", None).is_empty_scope());
        assert!(directory("company", "robot", None).is_empty_scope());
    }

    #[test]
    fn branch_directory_uses_branch_owner() {
        let (_, params) = rendered_where(&directory("branch", "company", Some("client")));
        assert_eq!(params, vec![Value::from("branch"), Value::from(3), Value::from("company"), Value::from("client")]);
    }

    #[test]
    fn contractor_without_model_id_is_rejected() {
        let selector = JobcardSelector { model: JobcardModel::Contractor, model_id: parse_model_id(Some("")), step: None };
        let err = resolve_jobcards(&actor(), &selector).unwrap_err();
        assert_eq!(err.to_string(), "include contractor id");
    }

    #[test]
    fn contractor_scope_uses_pivot_subquery() {
        let selector = JobcardSelector { model: JobcardModel::Contractor, model_id: Some(9), step: None };
        let spec = resolve_jobcards(&actor(), &selector).unwrap();
        assert_eq!(spec.root(), ScopeRoot::Contractor(9));
        let (sql, _) = rendered_where(&spec);
        assert!(sql.contains("EXISTS (SELECT 1 FROM \"jobcard_contractors\""));
    }

    #[test]
    fn branch_scope_requires_actor_branch() {
        let selector = JobcardSelector { model: JobcardModel::Branch, model_id: None, step: None };
        let orphan = Actor::new(5, None, None);
        assert!(matches!(resolve_jobcards(&orphan, &selector), Err(ScopeError::ActorWithoutBranch)));
    }

    #[test]
    fn step_is_layered_over_root() {
        let selector = JobcardSelector { model: JobcardModel::Branch, model_id: None, step: None };
        let spec = apply_step(resolve_jobcards(&actor(), &selector).unwrap(), 4, "open");
        assert_eq!(spec.root(), ScopeRoot::Branch(3));
        assert_eq!(spec.predicates().len(), 2);

        let widened = apply_step(QuerySpec::empty(Entity::Jobcard), 4, "open");
        assert_eq!(widened.root(), ScopeRoot::Unrestricted);
        assert_eq!(widened.predicates().len(), 1);
    }

    #[test]
    fn invoices_have_no_third_party_scopes() {
        let spec = resolve_invoices(&actor(), &InvoiceSelector { model: InvoiceModel::parse(Some("contractor")) }).unwrap();
        assert!(spec.is_empty_scope());
        let spec = resolve_invoices(&actor(), &InvoiceSelector { model: InvoiceModel::Company }).unwrap();
        assert_eq!(spec.root(), ScopeRoot::Company(2));
    }

    #[test]
    fn pivot_relation_joins_pivot_table() {
        let relation = Entity::Jobcard.def().relation("contractorsList").unwrap();
        assert!(matches!(relation.kind, RelationKind::BelongsToMany { .. }));
        let spec = relation_spec(Entity::Jobcard, relation, vec![Value::from(7)]);
        assert!(spec.has_table("jobcard_contractors"));
        let (sql, params) = rendered_where(&spec);
        assert!(sql.contains("\"jobcard_contractors\".\"jobcard_id\" IN ($1)"));
        assert_eq!(params, vec![Value::from(7)]);
    }
}
