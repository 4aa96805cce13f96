use super::{Entity, EntityDef, RelationDef, RelationKind};

pub static USER: EntityDef = EntityDef {
    table: "users",
    morph_type: "user",
    soft_deletes: true,
    hidden: &["password", "remember_token"],
    allowed_filters: &[
        "id", "first_name", "last_name", "gender", "date_of_birth", "bio",
        "address_1", "address_2", "country", "province", "city", "postal_or_zipcode",
        "email", "additional_email", "username", "verified", "setup",
        "facebook_link", "twitter_link", "linkedin_link", "instagram_link", "youtube_link",
        "company_branch_id", "company_id", "created_at",
    ],
    orderable: &[
        "id", "first_name", "last_name", "gender", "date_of_birth",
        "country", "province", "city", "postal_or_zipcode",
        "email", "username", "verified", "setup",
        "company_branch_id", "company_id", "created_at",
    ],
    relations: &[
        RelationDef { name: "phones", target: Entity::Phone, kind: RelationKind::MorphMany },
        RelationDef {
            name: "companyBranch",
            target: Entity::CompanyBranch,
            kind: RelationKind::BelongsTo { foreign_key: "company_branch_id" },
        },
        RelationDef {
            name: "company",
            target: Entity::Company,
            kind: RelationKind::BelongsTo { foreign_key: "company_id" },
        },
    ],
};

pub static COMPANY: EntityDef = EntityDef {
    table: "companies",
    morph_type: "company",
    soft_deletes: true,
    hidden: &[],
    allowed_filters: &[
        "id", "name", "description", "type", "industry", "email", "website_link",
        "address_1", "address_2", "country", "province", "city", "postal_or_zipcode",
        "created_at",
    ],
    orderable: &[
        "id", "name", "type", "industry", "email", "country", "province", "city", "created_at",
    ],
    relations: &[
        RelationDef { name: "phones", target: Entity::Phone, kind: RelationKind::MorphMany },
        RelationDef {
            name: "branches",
            target: Entity::CompanyBranch,
            kind: RelationKind::HasMany { foreign_key: "company_id" },
        },
        RelationDef {
            name: "jobcards",
            target: Entity::Jobcard,
            kind: RelationKind::HasMany { foreign_key: "company_id" },
        },
        RelationDef {
            name: "invoices",
            target: Entity::Invoice,
            kind: RelationKind::HasMany { foreign_key: "company_id" },
        },
    ],
};

pub static COMPANY_BRANCH: EntityDef = EntityDef {
    table: "company_branches",
    morph_type: "branch",
    soft_deletes: true,
    hidden: &[],
    allowed_filters: &["id", "name", "destination", "company_id", "created_at"],
    orderable: &["id", "name", "destination", "company_id", "created_at"],
    relations: &[
        RelationDef {
            name: "company",
            target: Entity::Company,
            kind: RelationKind::BelongsTo { foreign_key: "company_id" },
        },
        RelationDef {
            name: "jobcards",
            target: Entity::Jobcard,
            kind: RelationKind::HasMany { foreign_key: "company_branch_id" },
        },
        RelationDef {
            name: "invoices",
            target: Entity::Invoice,
            kind: RelationKind::HasMany { foreign_key: "company_branch_id" },
        },
    ],
};

pub static JOBCARD: EntityDef = EntityDef {
    table: "jobcards",
    morph_type: "jobcard",
    soft_deletes: true,
    hidden: &[],
    allowed_filters: &[
        "id", "title", "description", "start_date", "end_date", "priority", "cost_center",
        "client_id", "company_branch_id", "company_id", "created_at", "updated_at",
    ],
    orderable: &[
        "id", "title", "start_date", "end_date", "priority", "cost_center",
        "client_id", "company_branch_id", "company_id", "created_at", "updated_at",
    ],
    relations: &[
        RelationDef {
            name: "client",
            target: Entity::Company,
            kind: RelationKind::BelongsTo { foreign_key: "client_id" },
        },
        RelationDef {
            name: "contractorsList",
            target: Entity::Company,
            kind: RelationKind::BelongsToMany {
                pivot: "jobcard_contractors",
                parent_key: "jobcard_id",
                related_key: "contractor_id",
            },
        },
        RelationDef { name: "statusLifecycle", target: Entity::FormAllocation, kind: RelationKind::MorphMany },
        RelationDef {
            name: "companyBranch",
            target: Entity::CompanyBranch,
            kind: RelationKind::BelongsTo { foreign_key: "company_branch_id" },
        },
        RelationDef {
            name: "company",
            target: Entity::Company,
            kind: RelationKind::BelongsTo { foreign_key: "company_id" },
        },
    ],
};

pub static INVOICE: EntityDef = EntityDef {
    table: "invoices",
    morph_type: "invoice",
    soft_deletes: true,
    hidden: &[],
    allowed_filters: &[
        "id", "status", "heading", "reference_no_value", "created_date_value", "expiry_date_value",
        "sub_total_value", "grand_total_value", "client_id", "trackable_type", "trackable_id",
        "company_branch_id", "company_id", "created_at", "updated_at",
    ],
    orderable: &[
        "id", "status", "heading", "reference_no_value", "created_date_value", "expiry_date_value",
        "sub_total_value", "grand_total_value", "client_id", "created_at", "updated_at",
    ],
    relations: &[
        RelationDef {
            name: "client",
            target: Entity::Company,
            kind: RelationKind::BelongsTo { foreign_key: "client_id" },
        },
        RelationDef {
            name: "companyBranch",
            target: Entity::CompanyBranch,
            kind: RelationKind::BelongsTo { foreign_key: "company_branch_id" },
        },
        RelationDef {
            name: "company",
            target: Entity::Company,
            kind: RelationKind::BelongsTo { foreign_key: "company_id" },
        },
    ],
};

pub static FORM_TEMPLATE: EntityDef = EntityDef {
    table: "form_templates",
    morph_type: "form_template",
    soft_deletes: false,
    hidden: &[],
    allowed_filters: &["id", "name", "type", "selected", "company_id", "created_at"],
    orderable: &["id", "name", "type", "created_at"],
    relations: &[RelationDef {
        name: "formAllocations",
        target: Entity::FormAllocation,
        kind: RelationKind::HasMany { foreign_key: "form_template_id" },
    }],
};

pub static FORM_ALLOCATION: EntityDef = EntityDef {
    table: "form_allocations",
    morph_type: "form_allocation",
    soft_deletes: false,
    hidden: &[],
    allowed_filters: &["id", "step", "form_template_id", "trackable_type", "trackable_id", "created_at"],
    orderable: &["id", "step", "created_at", "updated_at"],
    relations: &[RelationDef {
        name: "formTemplate",
        target: Entity::FormTemplate,
        kind: RelationKind::BelongsTo { foreign_key: "form_template_id" },
    }],
};

pub static PHONE: EntityDef = EntityDef {
    table: "phones",
    morph_type: "phone",
    soft_deletes: false,
    hidden: &[],
    allowed_filters: &["id", "type", "calling_code", "number", "created_at"],
    orderable: &["id", "type", "created_at"],
    relations: &[],
};

pub static CATEGORY: EntityDef = EntityDef {
    table: "categories",
    morph_type: "category",
    soft_deletes: false,
    hidden: &[],
    allowed_filters: &["id", "name", "type", "created_at"],
    orderable: &["id", "name", "type", "created_at"],
    relations: &[],
};
