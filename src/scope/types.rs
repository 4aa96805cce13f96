use thiserror::Error;

/// Which organizational unit of the actor a directory listing hangs off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Association {
    Company,
    Branch,
    All,
    Unmapped,
}

impl Association {
    pub fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("company") {
            "company" => Association::Company,
            "branch" => Association::Branch,
            "all" => Association::All,
            _ => Association::Unmapped,
        }
    }
}

/// Whether directory entries are companies or individual users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryKind {
    Company,
    User,
    Unmapped,
}

impl DirectoryKind {
    pub fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("user") {
            "company" => DirectoryKind::Company,
            "user" => DirectoryKind::User,
            _ => DirectoryKind::Unmapped,
        }
    }
}

/// Relationship a directory entry has with its owner.
///
/// Anything other than `client` or `supplier` lists the whole directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryType {
    Client,
    Supplier,
    Any,
}

impl DirectoryType {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("client") => DirectoryType::Client,
            Some("supplier") => DirectoryType::Supplier,
            _ => DirectoryType::Any,
        }
    }

    /// Value of `company_directory.type`, if restricted
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            DirectoryType::Client => Some("client"),
            DirectoryType::Supplier => Some("supplier"),
            DirectoryType::Any => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobcardModel {
    Company,
    Branch,
    Client,
    Contractor,
    All,
    Unmapped,
}

impl JobcardModel {
    pub fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("branch") {
            "company" => JobcardModel::Company,
            "branch" => JobcardModel::Branch,
            "client" => JobcardModel::Client,
            "contractor" => JobcardModel::Contractor,
            "all" => JobcardModel::All,
            _ => JobcardModel::Unmapped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceModel {
    Company,
    Branch,
    All,
    Unmapped,
}

impl InvoiceModel {
    pub fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("branch") {
            "company" => InvoiceModel::Company,
            "branch" => InvoiceModel::Branch,
            "all" => InvoiceModel::All,
            _ => InvoiceModel::Unmapped,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySelector {
    pub association: Association,
    pub kind: DirectoryKind,
    pub listing_type: DirectoryType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobcardSelector {
    pub model: JobcardModel,
    /// Third party id for `client` / `contractor`. Blank and `0` count as absent.
    pub model_id: Option<i64>,
    pub step: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceSelector {
    pub model: InvoiceModel,
}

/// Parse a `modelId` query value. Blank, zero and non-numeric values are
/// treated the same as a missing id.
pub fn parse_model_id(value: Option<&str>) -> Option<i64> {
    value
        .map(str::trim)
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|id| *id != 0)
}

#[derive(Error, Debug)]
pub enum ScopeError {
    /// A third-party scope was asked for without naming the third party
    #[error("include {0} id")]
    MissingModelId(&'static str),

    #[error("Authenticated user is not assigned to a company branch")]
    ActorWithoutBranch,

    #[error("Authenticated user's branch does not belong to a company")]
    ActorWithoutCompany,

    #[error("No jobcard lifecycle template is selected for this company")]
    TemplateNotSelected,
}
