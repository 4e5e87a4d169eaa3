/// Platform object kinds and the recipes that describe them
use crate::bridge::{HostRequest, Method};
use crate::codec::{ExtractConfig, IdPattern, expand_template, id_value};
use crate::error::{Result, ToolkitError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;

/// Stable symbolic identifier of an object kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectTypeId {
    Page,
    DataAppTemplate,
    DataAppView,
    DataApp,
    WorksheetView,
    Worksheet,
    DrillPath,
    Card,
    DataSource,
    DatasetView,
    FederatedDataSource,
    DataflowExecution,
    MagicEtl,
    SqlDataflow,
    Dataflow,
    Account,
    FilesetFile,
    Fileset,
    AppdbDocument,
    AppdbCollection,
    AppdbDatastore,
    Variable,
    User,
    Group,
    Role,
    Publication,
    Subscription,
    ApiClient,
    CustomApp,
    Alert,
    BuzzThread,
    BuzzChannel,
    Goal,
    WorkflowInstance,
    WorkflowTrigger,
    WorkflowModel,
    CodeEnginePackage,
    JupyterWorkspace,
    AiModel,
    AiProject,
    ProjectTask,
    ProjectList,
    Project,
    SandboxCommit,
    SandboxRepository,
    SandboxDeployment,
    TaskCenterTask,
    TaskCenterQueue,
    Approval,
    ApprovalTemplate,
    FormResponse,
    Form,
    PageCollection,
    CardAnnotation,
    AlertSubscription,
    PdpPolicy,
    KeyResult,
    GoalPeriod,
    GoalCampaign,
    Segment,
    BeastMode,
    ReportSchedule,
    Stream,
    AccessToken,
    DataAppTheme,
    DataFile,
}

impl ObjectTypeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectTypeId::Page => "PAGE",
            ObjectTypeId::DataAppTemplate => "DATA_APP_TEMPLATE",
            ObjectTypeId::DataAppView => "DATA_APP_VIEW",
            ObjectTypeId::DataApp => "DATA_APP",
            ObjectTypeId::WorksheetView => "WORKSHEET_VIEW",
            ObjectTypeId::Worksheet => "WORKSHEET",
            ObjectTypeId::DrillPath => "DRILL_PATH",
            ObjectTypeId::Card => "CARD",
            ObjectTypeId::DataSource => "DATA_SOURCE",
            ObjectTypeId::DatasetView => "DATASET_VIEW",
            ObjectTypeId::FederatedDataSource => "FEDERATED_DATA_SOURCE",
            ObjectTypeId::DataflowExecution => "DATAFLOW_EXECUTION",
            ObjectTypeId::MagicEtl => "MAGIC_ETL",
            ObjectTypeId::SqlDataflow => "SQL_DATAFLOW",
            ObjectTypeId::Dataflow => "DATAFLOW",
            ObjectTypeId::Account => "ACCOUNT",
            ObjectTypeId::FilesetFile => "FILESET_FILE",
            ObjectTypeId::Fileset => "FILESET",
            ObjectTypeId::AppdbDocument => "APPDB_DOCUMENT",
            ObjectTypeId::AppdbCollection => "APPDB_COLLECTION",
            ObjectTypeId::AppdbDatastore => "APPDB_DATASTORE",
            ObjectTypeId::Variable => "VARIABLE",
            ObjectTypeId::User => "USER",
            ObjectTypeId::Group => "GROUP",
            ObjectTypeId::Role => "ROLE",
            ObjectTypeId::Publication => "PUBLICATION",
            ObjectTypeId::Subscription => "SUBSCRIPTION",
            ObjectTypeId::ApiClient => "API_CLIENT",
            ObjectTypeId::CustomApp => "CUSTOM_APP",
            ObjectTypeId::Alert => "ALERT",
            ObjectTypeId::BuzzThread => "BUZZ_THREAD",
            ObjectTypeId::BuzzChannel => "BUZZ_CHANNEL",
            ObjectTypeId::Goal => "GOAL",
            ObjectTypeId::WorkflowInstance => "WORKFLOW_INSTANCE",
            ObjectTypeId::WorkflowTrigger => "WORKFLOW_TRIGGER",
            ObjectTypeId::WorkflowModel => "WORKFLOW_MODEL",
            ObjectTypeId::CodeEnginePackage => "CODE_ENGINE_PACKAGE",
            ObjectTypeId::JupyterWorkspace => "JUPYTER_WORKSPACE",
            ObjectTypeId::AiModel => "AI_MODEL",
            ObjectTypeId::AiProject => "AI_PROJECT",
            ObjectTypeId::ProjectTask => "PROJECT_TASK",
            ObjectTypeId::ProjectList => "PROJECT_LIST",
            ObjectTypeId::Project => "PROJECT",
            ObjectTypeId::SandboxCommit => "SANDBOX_COMMIT",
            ObjectTypeId::SandboxRepository => "SANDBOX_REPOSITORY",
            ObjectTypeId::SandboxDeployment => "SANDBOX_DEPLOYMENT",
            ObjectTypeId::TaskCenterTask => "TASK_CENTER_TASK",
            ObjectTypeId::TaskCenterQueue => "TASK_CENTER_QUEUE",
            ObjectTypeId::Approval => "APPROVAL",
            ObjectTypeId::ApprovalTemplate => "APPROVAL_TEMPLATE",
            ObjectTypeId::FormResponse => "FORM_RESPONSE",
            ObjectTypeId::Form => "FORM",
            ObjectTypeId::PageCollection => "PAGE_COLLECTION",
            ObjectTypeId::CardAnnotation => "CARD_ANNOTATION",
            ObjectTypeId::AlertSubscription => "ALERT_SUBSCRIPTION",
            ObjectTypeId::PdpPolicy => "PDP_POLICY",
            ObjectTypeId::KeyResult => "KEY_RESULT",
            ObjectTypeId::GoalPeriod => "GOAL_PERIOD",
            ObjectTypeId::GoalCampaign => "GOAL_CAMPAIGN",
            ObjectTypeId::Segment => "SEGMENT",
            ObjectTypeId::BeastMode => "BEAST_MODE",
            ObjectTypeId::ReportSchedule => "REPORT_SCHEDULE",
            ObjectTypeId::Stream => "STREAM",
            ObjectTypeId::AccessToken => "ACCESS_TOKEN",
            ObjectTypeId::DataAppTheme => "DATA_APP_THEME",
            ObjectTypeId::DataFile => "DATA_FILE",
        }
    }
}

impl fmt::Display for ObjectTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectTypeId {
    type Err = ToolkitError;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_value(Value::from(s))
            .map_err(|_| ToolkitError::Unsupported(format!("unknown object type {}", s)))
    }
}

/// Recipe for reading an object's metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiRecipe {
    pub method: Method,
    /// Endpoint with `{id}` / `{parent}` slots
    pub endpoint: &'static str,
    /// Dotted path to the display name in the response
    pub path_to_name: &'static str,
    /// JSON body with `{id}` / `{parent}` slots
    pub body: Option<&'static str>,
}

impl ApiRecipe {
    const fn get(endpoint: &'static str, path_to_name: &'static str) -> Self {
        ApiRecipe { method: Method::Get, endpoint, path_to_name, body: None }
    }

    const fn post(endpoint: &'static str, path_to_name: &'static str, body: &'static str) -> Self {
        ApiRecipe { method: Method::Post, endpoint, path_to_name, body: Some(body) }
    }

    pub fn request(&self, id: &str, parent: Option<&str>) -> Result<HostRequest> {
        let path = expand_template(self.endpoint, id, parent)?;
        let body = match self.body {
            Some(template) => Some(serde_json::from_str(&expand_template(template, id, parent)?)?),
            None => None,
        };
        Ok(HostRequest { method: self.method, path, body })
    }
}

/// A parent relationship and what it is needed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    pub type_id: ObjectTypeId,
    pub for_url: bool,
    pub for_api: bool,
}

/// How to discover a missing parent through the data plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentLookup {
    /// Fetch `endpoint` and read the parent id at `path`
    Endpoint { endpoint: &'static str, path: &'static str },
    /// Fetch `endpoint`, read a related object's id at `path`, then resolve
    /// the parent through the related type's own lookup
    Via {
        endpoint: &'static str,
        path: &'static str,
        related: ObjectTypeId,
    },
}

/// How "share with self" is expressed for a type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareRecipe {
    /// Recipient entry on the content share endpoint
    ContentRecipient { resource: &'static str },
    /// Co-owner grant on a data source
    DataSourceGrant,
    /// Owner grant on an integration account
    AccountGrant,
    /// Admin permission on a custom app design
    DesignPermission,
    /// Membership in a group
    GroupMember,
    /// Owner entry on an app-studio app
    DataAppOwner,
    /// Generic access list: `PUT endpoint` with a user entry
    AccessList { endpoint: &'static str },
}

impl ShareRecipe {
    pub fn request(&self, id: &str, user_id: &str) -> Result<HostRequest> {
        let user = id_value(user_id);
        let request = match *self {
            ShareRecipe::ContentRecipient { resource } => HostRequest::with_body(
                Method::Post,
                "/api/content/v1/share?sendEmail=false",
                json!({
                    "resources": [{"type": resource, "id": id_value(id)}],
                    "recipients": [{"type": "user", "id": user}],
                    "message": "",
                }),
            ),
            ShareRecipe::DataSourceGrant => HostRequest::with_body(
                Method::Post,
                format!("/api/data/v3/datasources/{}/share", id),
                json!({
                    "permissions": [{"type": "USER", "id": user, "accessLevel": "CO_OWNER"}],
                    "sendEmail": false,
                }),
            ),
            ShareRecipe::AccountGrant => HostRequest::with_body(
                Method::Post,
                format!("/api/data/v2/accounts/share/{}", id),
                json!({"type": "USER", "id": user, "accessLevel": "OWNER"}),
            ),
            ShareRecipe::DesignPermission => HostRequest::with_body(
                Method::Post,
                format!("/domoapps/designs/{}/permissions/ADMIN", id),
                json!([user]),
            ),
            ShareRecipe::GroupMember => HostRequest::with_body(
                Method::Put,
                "/api/content/v2/groups/access",
                json!([{"groupId": id_value(id), "addMembers": [{"type": "USER", "id": user}]}]),
            ),
            ShareRecipe::DataAppOwner => HostRequest::with_body(
                Method::Put,
                format!("/api/content/v1/dataapps/{}/owners", id),
                json!({"owners": [{"type": "USER", "id": user}]}),
            ),
            ShareRecipe::AccessList { endpoint } => HostRequest::with_body(
                Method::Put,
                expand_template(endpoint, id, None)?,
                json!({"entities": [{"type": "USER", "id": user, "accessLevel": "OWNER"}]}),
            ),
        };
        Ok(request)
    }
}

/// How an object is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteRecipe {
    /// `DELETE endpoint`
    Endpoint(&'static str),
    /// `POST endpoint` with the id listed under `field`
    Bulk { endpoint: &'static str, field: &'static str },
}

impl DeleteRecipe {
    pub fn request(&self, id: &str, parent: Option<&str>) -> Result<HostRequest> {
        match *self {
            DeleteRecipe::Endpoint(endpoint) => Ok(HostRequest::delete(expand_template(endpoint, id, parent)?)),
            DeleteRecipe::Bulk { endpoint, field } => {
                let mut body = serde_json::Map::new();
                body.insert(field.to_string(), json!([id_value(id)]));
                Ok(HostRequest::with_body(
                    Method::Post,
                    expand_template(endpoint, id, parent)?,
                    Value::Object(body),
                ))
            }
        }
    }
}

/// A second identifier worth copying, read from enriched metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecondaryId {
    pub label: &'static str,
    pub path: &'static str,
}

/// Immutable descriptor of an object kind
#[derive(Debug)]
pub struct ObjectType {
    pub id: ObjectTypeId,
    pub display_name: &'static str,
    /// Path template relative to the instance origin
    pub url_path: Option<&'static str>,
    pub id_pattern: IdPattern,
    pub extract: Option<ExtractConfig>,
    /// Where the parent id sits in the URL when the template has no slot for it
    pub parent_extract: Option<ExtractConfig>,
    /// Query parameter that may carry the parent id
    pub parent_query: Option<&'static str>,
    pub metadata_api: Option<ApiRecipe>,
    pub parents: &'static [ParentLink],
    pub parent_lookup: Option<ParentLookup>,
    pub share: Option<ShareRecipe>,
    pub delete: Option<DeleteRecipe>,
    pub secondary_id: Option<SecondaryId>,
}

impl ObjectType {
    pub fn has_url(&self) -> bool {
        self.url_path.is_some()
    }

    pub fn requires_parent_for_url(&self) -> bool {
        self.parents.iter().any(|link| link.for_url)
    }

    pub fn requires_parent_for_api(&self) -> bool {
        self.parents.iter().any(|link| link.for_api)
    }

    pub fn supports_share_with_self(&self) -> bool {
        self.share.is_some()
    }

    pub fn supports_delete(&self) -> bool {
        self.delete.is_some()
    }

    pub fn parent_type(&self) -> Option<ObjectTypeId> {
        self.parents.first().map(|link| link.type_id)
    }

    pub fn validate(&self, candidate: &str) -> bool {
        self.id_pattern.matches(candidate)
    }
}

const fn base(id: ObjectTypeId, display_name: &'static str, id_pattern: IdPattern) -> ObjectType {
    ObjectType {
        id,
        display_name,
        url_path: None,
        id_pattern,
        extract: None,
        parent_extract: None,
        parent_query: None,
        metadata_api: None,
        parents: &[],
        parent_lookup: None,
        share: None,
        delete: None,
        secondary_id: None,
    }
}

use IdPattern::{Integer, Uuid};

/// Every known object kind, in identification order. More specific URL
/// templates must come before templates that would match their prefix.
pub static OBJECT_TYPES: &[ObjectType] = &[
    ObjectType {
        url_path: Some("page/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "page", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/content/v1/pages/{id}", "title")),
        share: Some(ShareRecipe::ContentRecipient { resource: "page" }),
        delete: Some(DeleteRecipe::Endpoint("/api/content/v1/pages/{id}")),
        ..base(ObjectTypeId::Page, "Page", Integer)
    },
    ObjectType {
        url_path: Some("app-studio/templates/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "templates", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/content/v1/dataapps/templates/{id}", "title")),
        delete: Some(DeleteRecipe::Endpoint("/api/content/v1/dataapps/templates/{id}")),
        ..base(ObjectTypeId::DataAppTemplate, "App Studio Template", Integer)
    },
    ObjectType {
        url_path: Some("app-studio/{parent}/pages/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "pages", offset: 1 }),
        parent_extract: Some(ExtractConfig::Keyword { keyword: "app-studio", offset: 1 }),
        parent_query: Some("appId"),
        metadata_api: Some(ApiRecipe::get("/api/content/v1/dataapps/{parent}/views/{id}", "title")),
        parents: &[ParentLink { type_id: ObjectTypeId::DataApp, for_url: true, for_api: true }],
        parent_lookup: Some(ParentLookup::Via {
            endpoint: "/api/content/v3/stacks/{id}/cards",
            path: "cards.0.id",
            related: ObjectTypeId::Card,
        }),
        share: Some(ShareRecipe::ContentRecipient { resource: "page" }),
        ..base(ObjectTypeId::DataAppView, "App Studio Page", Integer)
    },
    ObjectType {
        url_path: Some("app-studio/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "app-studio", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/content/v1/dataapps/{id}", "title")),
        share: Some(ShareRecipe::DataAppOwner),
        delete: Some(DeleteRecipe::Endpoint("/api/content/v1/dataapps/{id}")),
        ..base(ObjectTypeId::DataApp, "App Studio App", Integer)
    },
    ObjectType {
        url_path: Some("worksheet/{parent}/pages/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "pages", offset: 1 }),
        parent_extract: Some(ExtractConfig::Keyword { keyword: "worksheet", offset: 1 }),
        parent_query: Some("worksheetId"),
        metadata_api: Some(ApiRecipe::get("/api/content/v1/dataapps/{parent}/views/{id}", "title")),
        parents: &[ParentLink { type_id: ObjectTypeId::Worksheet, for_url: true, for_api: true }],
        ..base(ObjectTypeId::WorksheetView, "Worksheet Page", Integer)
    },
    ObjectType {
        url_path: Some("worksheet/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "worksheet", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/content/v1/dataapps/{id}", "title")),
        share: Some(ShareRecipe::DataAppOwner),
        delete: Some(DeleteRecipe::Endpoint("/api/content/v1/dataapps/{id}")),
        ..base(ObjectTypeId::Worksheet, "Worksheet", Integer)
    },
    ObjectType {
        url_path: Some("kpis/details/{parent}/drill/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "drill", offset: 1 }),
        parent_extract: Some(ExtractConfig::Keyword { keyword: "details", offset: 1 }),
        parent_query: Some("cardId"),
        metadata_api: Some(ApiRecipe::get(
            "/api/content/v1/cards/{parent}/drillpath/{id}",
            "title",
        )),
        parents: &[ParentLink { type_id: ObjectTypeId::Card, for_url: true, for_api: true }],
        parent_lookup: Some(ParentLookup::Endpoint {
            endpoint: "/api/content/v1/cards?urns={id}&parts=drillPathRoot",
            path: "0.drillPathRoot.id",
        }),
        ..base(ObjectTypeId::DrillPath, "Drill Path", Integer)
    },
    ObjectType {
        url_path: Some("kpis/details/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "details", offset: 1 }),
        metadata_api: Some(ApiRecipe::get(
            "/api/content/v1/cards?urns={id}&parts=metadata,problems",
            "0.title",
        )),
        // The owning app of a card placed on an app-studio page
        parent_lookup: Some(ParentLookup::Endpoint {
            endpoint: "/api/content/v1/cards?urns={id}&parts=adminAllPages",
            path: "0.adminAllPages.0.appId",
        }),
        share: Some(ShareRecipe::ContentRecipient { resource: "badge" }),
        delete: Some(DeleteRecipe::Endpoint("/api/content/v1/cards/{id}")),
        ..base(ObjectTypeId::Card, "Card", Integer)
    },
    ObjectType {
        url_path: Some("datasources/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "datasources", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/data/v3/datasources/{id}?part=core", "name")),
        share: Some(ShareRecipe::DataSourceGrant),
        delete: Some(DeleteRecipe::Endpoint("/api/data/v3/datasources/{id}?deleteMethod=hard")),
        secondary_id: Some(SecondaryId { label: "Stream ID", path: "streamId" }),
        ..base(ObjectTypeId::DataSource, "DataSet", Uuid)
    },
    ObjectType {
        url_path: Some("datacenter/views/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "views", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/query/v1/views/{id}", "name")),
        share: Some(ShareRecipe::DataSourceGrant),
        delete: Some(DeleteRecipe::Endpoint("/api/query/v1/views/{id}")),
        ..base(ObjectTypeId::DatasetView, "DataSet View", Uuid)
    },
    ObjectType {
        url_path: Some("datacenter/federated/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "federated", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/query/v1/federated/sources/{id}", "name")),
        share: Some(ShareRecipe::DataSourceGrant),
        ..base(ObjectTypeId::FederatedDataSource, "Federated DataSet", Uuid)
    },
    ObjectType {
        url_path: Some("datacenter/dataflows/{parent}/executions/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "executions", offset: 1 }),
        parent_extract: Some(ExtractConfig::Keyword { keyword: "dataflows", offset: 1 }),
        metadata_api: Some(ApiRecipe::get(
            "/api/dataprocessing/v1/dataflows/{parent}/executions/{id}",
            "dataFlowName",
        )),
        parents: &[ParentLink { type_id: ObjectTypeId::Dataflow, for_url: true, for_api: true }],
        ..base(ObjectTypeId::DataflowExecution, "DataFlow Execution", Integer)
    },
    ObjectType {
        url_path: Some("datacenter/dataflows/{id}/graph"),
        extract: Some(ExtractConfig::Keyword { keyword: "dataflows", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/dataprocessing/v2/dataflows/{id}", "name")),
        share: Some(ShareRecipe::AccessList { endpoint: "/api/dataprocessing/v1/dataflows/{id}/permissions" }),
        delete: Some(DeleteRecipe::Endpoint("/api/dataprocessing/v1/dataflows/{id}")),
        ..base(ObjectTypeId::MagicEtl, "Magic ETL", Integer)
    },
    ObjectType {
        url_path: Some("datacenter/dataflows/{id}/author"),
        extract: Some(ExtractConfig::Keyword { keyword: "dataflows", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/dataprocessing/v1/dataflows/{id}?hydrationState=DEHYDRATED", "name")),
        share: Some(ShareRecipe::AccessList { endpoint: "/api/dataprocessing/v1/dataflows/{id}/permissions" }),
        delete: Some(DeleteRecipe::Endpoint("/api/dataprocessing/v1/dataflows/{id}")),
        ..base(ObjectTypeId::SqlDataflow, "SQL DataFlow", Integer)
    },
    ObjectType {
        url_path: Some("datacenter/dataflows/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "dataflows", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/dataprocessing/v1/dataflows/{id}", "name")),
        share: Some(ShareRecipe::AccessList { endpoint: "/api/dataprocessing/v1/dataflows/{id}/permissions" }),
        delete: Some(DeleteRecipe::Endpoint("/api/dataprocessing/v1/dataflows/{id}")),
        ..base(ObjectTypeId::Dataflow, "DataFlow", Integer)
    },
    ObjectType {
        url_path: Some("datacenter/accounts/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "accounts", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/data/v1/accounts/{id}", "displayName")),
        share: Some(ShareRecipe::AccountGrant),
        delete: Some(DeleteRecipe::Endpoint("/api/data/v1/accounts/{id}")),
        ..base(ObjectTypeId::Account, "Account", Integer)
    },
    ObjectType {
        url_path: Some("datacenter/filesets/{parent}/files/{id}"),
        extract: Some(ExtractConfig::FromEnd(0)),
        parent_extract: Some(ExtractConfig::Keyword { keyword: "filesets", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/files/v1/filesets/{parent}/files/{id}", "path")),
        parents: &[ParentLink { type_id: ObjectTypeId::Fileset, for_url: true, for_api: true }],
        delete: Some(DeleteRecipe::Endpoint("/api/files/v1/filesets/{parent}/files/{id}")),
        ..base(ObjectTypeId::FilesetFile, "FileSet File", Uuid)
    },
    ObjectType {
        url_path: Some("datacenter/filesets/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "filesets", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/files/v1/filesets/{id}", "name")),
        delete: Some(DeleteRecipe::Endpoint("/api/files/v1/filesets/{id}")),
        ..base(ObjectTypeId::Fileset, "FileSet", Uuid)
    },
    ObjectType {
        url_path: Some("datacenter/appdb/collections/{parent}/documents/{id}"),
        extract: Some(ExtractConfig::FromEnd(0)),
        parent_extract: Some(ExtractConfig::Keyword { keyword: "collections", offset: 1 }),
        metadata_api: Some(ApiRecipe::get(
            "/api/datastores/v1/collections/{parent}/documents/{id}",
            "content.name",
        )),
        parents: &[ParentLink { type_id: ObjectTypeId::AppdbCollection, for_url: true, for_api: true }],
        delete: Some(DeleteRecipe::Endpoint("/api/datastores/v1/collections/{parent}/documents/{id}")),
        ..base(ObjectTypeId::AppdbDocument, "AppDB Document", Uuid)
    },
    ObjectType {
        url_path: Some("datacenter/appdb/collections/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "collections", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/datastores/v1/collections/{id}", "name")),
        delete: Some(DeleteRecipe::Endpoint("/api/datastores/v1/collections/{id}")),
        ..base(ObjectTypeId::AppdbCollection, "AppDB Collection", Uuid)
    },
    ObjectType {
        url_path: Some("datacenter/appdb/datastores/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "datastores", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/datastores/v1/{id}", "name")),
        delete: Some(DeleteRecipe::Endpoint("/api/datastores/v1/{id}")),
        ..base(ObjectTypeId::AppdbDatastore, "AppDB Datastore", Uuid)
    },
    ObjectType {
        url_path: Some("datacenter/variables/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "variables", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/query/v1/functions/variables/{id}", "name")),
        delete: Some(DeleteRecipe::Endpoint("/api/query/v1/functions/variables/{id}")),
        ..base(ObjectTypeId::Variable, "Variable", Integer)
    },
    ObjectType {
        url_path: Some("admin/people/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "people", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/identity/v1/users/{id}?parts=detailed", "user.displayName")),
        delete: Some(DeleteRecipe::Endpoint("/api/identity/v1/users/{id}")),
        ..base(ObjectTypeId::User, "User", Integer)
    },
    ObjectType {
        url_path: Some("admin/groups/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "groups", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/content/v2/groups/{id}", "name")),
        share: Some(ShareRecipe::GroupMember),
        delete: Some(DeleteRecipe::Endpoint("/api/content/v2/groups/{id}")),
        ..base(ObjectTypeId::Group, "Group", Integer)
    },
    ObjectType {
        url_path: Some("admin/roles/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "roles", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/authorization/v1/roles/{id}", "name")),
        delete: Some(DeleteRecipe::Endpoint("/api/authorization/v1/roles/{id}")),
        ..base(ObjectTypeId::Role, "Role", Integer)
    },
    ObjectType {
        url_path: Some("admin/domo-everywhere/publications/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "publications", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/publish/v2/publications/{id}", "name")),
        delete: Some(DeleteRecipe::Endpoint("/api/publish/v2/publications/{id}")),
        ..base(ObjectTypeId::Publication, "Publication", Uuid)
    },
    ObjectType {
        url_path: Some("admin/domo-everywhere/subscriptions/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "subscriptions", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/publish/v2/subscriptions/{id}/summary", "publicationName")),
        ..base(ObjectTypeId::Subscription, "Subscription", Uuid)
    },
    ObjectType {
        url_path: Some("admin/security/clients/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "clients", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/identity/v1/clients/{id}", "name")),
        delete: Some(DeleteRecipe::Endpoint("/api/identity/v1/clients/{id}")),
        ..base(ObjectTypeId::ApiClient, "API Client", Uuid)
    },
    ObjectType {
        url_path: Some("assetlibrary/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "assetlibrary", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/domoapps/designs/{id}?parts=owners,versions", "name")),
        share: Some(ShareRecipe::DesignPermission),
        delete: Some(DeleteRecipe::Endpoint("/domoapps/designs/{id}")),
        ..base(ObjectTypeId::CustomApp, "Custom App Design", Uuid)
    },
    ObjectType {
        url_path: Some("alerts/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "alerts", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/social/v4/alerts/{id}", "name")),
        share: Some(ShareRecipe::AccessList { endpoint: "/api/social/v4/alerts/{id}/subscriptions" }),
        delete: Some(DeleteRecipe::Endpoint("/api/social/v4/alerts/{id}")),
        ..base(ObjectTypeId::Alert, "Alert", Integer)
    },
    ObjectType {
        url_path: Some("buzz/channel/{parent}/thread/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "thread", offset: 1 }),
        parent_extract: Some(ExtractConfig::Keyword { keyword: "channel", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/buzz/v1/threads/{id}", "title")),
        parents: &[ParentLink { type_id: ObjectTypeId::BuzzChannel, for_url: true, for_api: false }],
        parent_lookup: Some(ParentLookup::Endpoint {
            endpoint: "/api/buzz/v1/threads/{id}",
            path: "channelId",
        }),
        ..base(ObjectTypeId::BuzzThread, "Buzz Thread", Uuid)
    },
    ObjectType {
        url_path: Some("buzz/channel/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "channel", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/buzz/v1/channels/{id}", "title")),
        share: Some(ShareRecipe::AccessList { endpoint: "/api/buzz/v1/channels/{id}/members" }),
        delete: Some(DeleteRecipe::Endpoint("/api/buzz/v1/channels/{id}")),
        ..base(ObjectTypeId::BuzzChannel, "Buzz Channel", Uuid)
    },
    ObjectType {
        url_path: Some("goals/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "goals", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/social/v2/objectives/{id}", "name")),
        delete: Some(DeleteRecipe::Endpoint("/api/social/v2/objectives/{id}")),
        ..base(ObjectTypeId::Goal, "Goal", Integer)
    },
    ObjectType {
        url_path: Some("workflows/models/{parent}/instances/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "instances", offset: 1 }),
        parent_extract: Some(ExtractConfig::Keyword { keyword: "models", offset: 1 }),
        parent_query: Some("modelId"),
        metadata_api: Some(ApiRecipe::get("/api/workflow/v2/executions/{id}", "modelName")),
        parents: &[ParentLink { type_id: ObjectTypeId::WorkflowModel, for_url: true, for_api: false }],
        parent_lookup: Some(ParentLookup::Endpoint {
            endpoint: "/api/workflow/v2/executions/{id}",
            path: "modelId",
        }),
        ..base(ObjectTypeId::WorkflowInstance, "Workflow Execution", Uuid)
    },
    ObjectType {
        url_path: Some("workflows/models/{parent}/triggers/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "triggers", offset: 1 }),
        parent_extract: Some(ExtractConfig::Keyword { keyword: "models", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/workflow/v1/models/{parent}/triggers/{id}", "name")),
        parents: &[ParentLink { type_id: ObjectTypeId::WorkflowModel, for_url: true, for_api: true }],
        delete: Some(DeleteRecipe::Endpoint("/api/workflow/v1/models/{parent}/triggers/{id}")),
        ..base(ObjectTypeId::WorkflowTrigger, "Workflow Trigger", Uuid)
    },
    ObjectType {
        url_path: Some("workflows/models/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "models", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/workflow/v1/models/{id}", "name")),
        share: Some(ShareRecipe::AccessList { endpoint: "/api/workflow/v1/models/{id}/permissions" }),
        delete: Some(DeleteRecipe::Endpoint("/api/workflow/v1/models/{id}")),
        ..base(ObjectTypeId::WorkflowModel, "Workflow", Uuid)
    },
    ObjectType {
        url_path: Some("codeengine/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "codeengine", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/codeengine/v2/packages/{id}", "name")),
        share: Some(ShareRecipe::AccessList { endpoint: "/api/codeengine/v2/packages/{id}/permissions" }),
        delete: Some(DeleteRecipe::Endpoint("/api/codeengine/v2/packages/{id}")),
        ..base(ObjectTypeId::CodeEnginePackage, "Code Engine Package", Uuid)
    },
    ObjectType {
        url_path: Some("jupyter-workspaces/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "jupyter-workspaces", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/datascience/v1/workspaces/{id}", "name")),
        share: Some(ShareRecipe::AccessList { endpoint: "/api/datascience/v1/workspaces/{id}/share" }),
        delete: Some(DeleteRecipe::Endpoint("/api/datascience/v1/workspaces/{id}")),
        ..base(ObjectTypeId::JupyterWorkspace, "Jupyter Workspace", Uuid)
    },
    ObjectType {
        url_path: Some("ai-services/models/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "models", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/datascience/ml/v1/models/{id}", "name")),
        delete: Some(DeleteRecipe::Endpoint("/api/datascience/ml/v1/models/{id}")),
        ..base(ObjectTypeId::AiModel, "AI Model", Uuid)
    },
    ObjectType {
        url_path: Some("ai-services/projects/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "projects", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/datascience/ml/v1/projects/{id}", "name")),
        delete: Some(DeleteRecipe::Endpoint("/api/datascience/ml/v1/projects/{id}")),
        ..base(ObjectTypeId::AiProject, "AI Project", Uuid)
    },
    ObjectType {
        url_path: Some("project/{parent}/task/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "task", offset: 1 }),
        parent_extract: Some(ExtractConfig::Keyword { keyword: "project", offset: 1 }),
        parent_query: Some("projectId"),
        metadata_api: Some(ApiRecipe::get("/api/content/v1/projects/{parent}/tasks/{id}", "taskName")),
        parents: &[ParentLink { type_id: ObjectTypeId::Project, for_url: true, for_api: true }],
        parent_lookup: Some(ParentLookup::Endpoint {
            endpoint: "/api/content/v1/tasks/{id}",
            path: "projectId",
        }),
        delete: Some(DeleteRecipe::Endpoint("/api/content/v1/projects/{parent}/tasks/{id}")),
        ..base(ObjectTypeId::ProjectTask, "Project Task", Integer)
    },
    ObjectType {
        url_path: Some("project/{parent}/list/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "list", offset: 1 }),
        parent_extract: Some(ExtractConfig::Keyword { keyword: "project", offset: 1 }),
        parent_query: Some("projectId"),
        metadata_api: Some(ApiRecipe::get("/api/content/v1/projects/{parent}/lists/{id}", "name")),
        parents: &[ParentLink { type_id: ObjectTypeId::Project, for_url: true, for_api: true }],
        parent_lookup: Some(ParentLookup::Endpoint {
            endpoint: "/api/content/v1/lists/{id}",
            path: "projectId",
        }),
        delete: Some(DeleteRecipe::Endpoint("/api/content/v1/projects/{parent}/lists/{id}")),
        ..base(ObjectTypeId::ProjectList, "Project List", Integer)
    },
    ObjectType {
        url_path: Some("project/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "project", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/content/v1/projects/{id}", "projectName")),
        share: Some(ShareRecipe::AccessList { endpoint: "/api/content/v1/projects/{id}/members" }),
        delete: Some(DeleteRecipe::Endpoint("/api/content/v1/projects/{id}")),
        ..base(ObjectTypeId::Project, "Project", Integer)
    },
    ObjectType {
        url_path: Some("sandbox/repositories/{parent}/commits/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "commits", offset: 1 }),
        parent_extract: Some(ExtractConfig::Keyword { keyword: "repositories", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/version/v1/repositories/{parent}/commits/{id}", "summary")),
        parents: &[ParentLink { type_id: ObjectTypeId::SandboxRepository, for_url: true, for_api: true }],
        ..base(ObjectTypeId::SandboxCommit, "Sandbox Commit", Uuid)
    },
    ObjectType {
        url_path: Some("sandbox/repositories/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "repositories", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/version/v1/repositories/{id}", "name")),
        share: Some(ShareRecipe::AccessList { endpoint: "/api/version/v1/repositories/{id}/access" }),
        ..base(ObjectTypeId::SandboxRepository, "Sandbox Repository", Uuid)
    },
    ObjectType {
        url_path: Some("sandbox/deployments/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "deployments", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/version/v1/deployments/{id}", "name")),
        delete: Some(DeleteRecipe::Endpoint("/api/version/v1/deployments/{id}")),
        ..base(ObjectTypeId::SandboxDeployment, "Sandbox Deployment", Uuid)
    },
    ObjectType {
        url_path: Some("queues/{parent}/tasks/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "tasks", offset: 1 }),
        parent_extract: Some(ExtractConfig::Keyword { keyword: "queues", offset: 1 }),
        parent_query: Some("queueId"),
        metadata_api: Some(ApiRecipe::get("/api/queues/v1/tasks/{id}", "displayEntity.name")),
        parents: &[ParentLink { type_id: ObjectTypeId::TaskCenterQueue, for_url: true, for_api: false }],
        parent_lookup: Some(ParentLookup::Endpoint {
            endpoint: "/api/queues/v1/tasks/{id}",
            path: "queueId",
        }),
        ..base(ObjectTypeId::TaskCenterTask, "Task Center Task", Uuid)
    },
    ObjectType {
        url_path: Some("queues/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "queues", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/queues/v1/{id}", "name")),
        delete: Some(DeleteRecipe::Endpoint("/api/queues/v1/{id}")),
        ..base(ObjectTypeId::TaskCenterQueue, "Task Center Queue", Uuid)
    },
    ObjectType {
        url_path: Some("approval/request-details/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "request-details", offset: 1 }),
        metadata_api: Some(ApiRecipe::post(
            "/api/synapse/approval/graphql",
            "data.request.title",
            r#"{"operationName":"getApprovalRequest","variables":{"id":"{id}"},"query":"query getApprovalRequest($id: ID!) { request: approval(id: $id) { id title } }"}"#,
        )),
        delete: Some(DeleteRecipe::Bulk { endpoint: "/api/synapse/approval/v1/requests/delete", field: "ids" }),
        ..base(ObjectTypeId::Approval, "Approval", Uuid)
    },
    ObjectType {
        url_path: Some("approval/edit-request-form/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "edit-request-form", offset: 1 }),
        metadata_api: Some(ApiRecipe::post(
            "/api/synapse/approval/graphql",
            "data.template.title",
            r#"{"operationName":"getTemplate","variables":{"id":"{id}"},"query":"query getTemplate($id: ID!) { template: template(id: $id) { id title } }"}"#,
        )),
        ..base(ObjectTypeId::ApprovalTemplate, "Approval Template", Integer)
    },
    ObjectType {
        url_path: Some("forms/{parent}/responses/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "responses", offset: 1 }),
        parent_extract: Some(ExtractConfig::Keyword { keyword: "forms", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/forms/v2/forms/{parent}/responses/{id}", "submittedBy.displayName")),
        parents: &[ParentLink { type_id: ObjectTypeId::Form, for_url: true, for_api: true }],
        ..base(ObjectTypeId::FormResponse, "Form Response", Uuid)
    },
    ObjectType {
        url_path: Some("forms/{id}"),
        extract: Some(ExtractConfig::Keyword { keyword: "forms", offset: 1 }),
        metadata_api: Some(ApiRecipe::get("/api/forms/v2/forms/{id}", "name")),
        delete: Some(DeleteRecipe::Endpoint("/api/forms/v2/forms/{id}")),
        ..base(ObjectTypeId::Form, "Form", Uuid)
    },
    ObjectType {
        metadata_api: Some(ApiRecipe::get("/api/content/v2/pages/{parent}/collections/{id}", "title")),
        parents: &[ParentLink { type_id: ObjectTypeId::Page, for_url: false, for_api: true }],
        parent_lookup: Some(ParentLookup::Endpoint {
            endpoint: "/api/content/v2/collections/{id}",
            path: "pageId",
        }),
        delete: Some(DeleteRecipe::Endpoint("/api/content/v2/pages/{parent}/collections/{id}")),
        ..base(ObjectTypeId::PageCollection, "Page Collection", Integer)
    },
    ObjectType {
        metadata_api: Some(ApiRecipe::get("/api/content/v1/cards/{parent}/annotations/{id}", "content")),
        parents: &[ParentLink { type_id: ObjectTypeId::Card, for_url: false, for_api: true }],
        delete: Some(DeleteRecipe::Endpoint("/api/content/v1/cards/{parent}/annotations/{id}")),
        ..base(ObjectTypeId::CardAnnotation, "Card Annotation", Integer)
    },
    ObjectType {
        metadata_api: Some(ApiRecipe::get("/api/social/v4/alerts/{parent}/subscriptions/{id}", "subscriberName")),
        parents: &[ParentLink { type_id: ObjectTypeId::Alert, for_url: false, for_api: true }],
        delete: Some(DeleteRecipe::Endpoint("/api/social/v4/alerts/{parent}/subscriptions/{id}")),
        ..base(ObjectTypeId::AlertSubscription, "Alert Subscription", Integer)
    },
    ObjectType {
        metadata_api: Some(ApiRecipe::get("/api/query/v1/data-control/{parent}/filter-groups/{id}", "name")),
        parents: &[ParentLink { type_id: ObjectTypeId::DataSource, for_url: false, for_api: true }],
        delete: Some(DeleteRecipe::Endpoint("/api/query/v1/data-control/{parent}/filter-groups/{id}")),
        ..base(ObjectTypeId::PdpPolicy, "PDP Policy", Integer)
    },
    ObjectType {
        metadata_api: Some(ApiRecipe::get("/api/social/v2/objectives/{parent}/key-results/{id}", "name")),
        parents: &[ParentLink { type_id: ObjectTypeId::Goal, for_url: false, for_api: true }],
        ..base(ObjectTypeId::KeyResult, "Key Result", Integer)
    },
    ObjectType {
        metadata_api: Some(ApiRecipe::get("/api/social/v1/objectives/periods/{id}", "name")),
        ..base(ObjectTypeId::GoalPeriod, "Goal Period", Integer)
    },
    ObjectType {
        metadata_api: Some(ApiRecipe::get("/api/social/v1/objectives/campaigns/{id}", "name")),
        delete: Some(DeleteRecipe::Endpoint("/api/social/v1/objectives/campaigns/{id}")),
        ..base(ObjectTypeId::GoalCampaign, "Goal Campaign", Integer)
    },
    ObjectType {
        metadata_api: Some(ApiRecipe::get("/api/query/v1/segments/{id}", "name")),
        delete: Some(DeleteRecipe::Endpoint("/api/query/v1/segments/{id}")),
        ..base(ObjectTypeId::Segment, "Segment", Integer)
    },
    ObjectType {
        metadata_api: Some(ApiRecipe::get("/api/query/v1/functions/template/{id}", "name")),
        delete: Some(DeleteRecipe::Endpoint("/api/query/v1/functions/template/{id}")),
        ..base(ObjectTypeId::BeastMode, "Beast Mode", Integer)
    },
    ObjectType {
        metadata_api: Some(ApiRecipe::get("/api/content/v1/reportschedules/{id}", "title")),
        delete: Some(DeleteRecipe::Endpoint("/api/content/v1/reportschedules/{id}")),
        ..base(ObjectTypeId::ReportSchedule, "Report Schedule", Integer)
    },
    ObjectType {
        metadata_api: Some(ApiRecipe::get("/api/data/v1/streams/{id}?fields=dataSource", "dataSource.name")),
        ..base(ObjectTypeId::Stream, "Stream", Integer)
    },
    ObjectType {
        metadata_api: Some(ApiRecipe::get("/api/data/v1/accesstokens/{id}", "name")),
        delete: Some(DeleteRecipe::Endpoint("/api/data/v1/accesstokens/{id}")),
        ..base(ObjectTypeId::AccessToken, "Access Token", Integer)
    },
    ObjectType {
        metadata_api: Some(ApiRecipe::get("/api/content/v1/dataapps/themes/{id}", "name")),
        delete: Some(DeleteRecipe::Endpoint("/api/content/v1/dataapps/themes/{id}")),
        ..base(ObjectTypeId::DataAppTheme, "App Studio Theme", Uuid)
    },
    ObjectType {
        metadata_api: Some(ApiRecipe::get("/api/data/v1/data-files/{id}/details", "name")),
        delete: Some(DeleteRecipe::Endpoint("/api/data/v1/data-files/{id}")),
        ..base(ObjectTypeId::DataFile, "Data File", Uuid)
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::build_path;

    #[test]
    fn test_type_ids_round_trip_through_strings() {
        for object_type in OBJECT_TYPES {
            let text = object_type.id.to_string();
            assert_eq!(text.parse::<ObjectTypeId>().unwrap(), object_type.id);
            assert_eq!(serde_json::to_value(object_type.id).unwrap(), Value::from(text));
        }
    }

    #[test]
    fn test_unknown_type_id() {
        assert!("NOT_A_TYPE".parse::<ObjectTypeId>().is_err());
    }

    #[test]
    fn test_capability_flags() {
        let view = OBJECT_TYPES.iter().find(|t| t.id == ObjectTypeId::DataAppView).unwrap();
        assert!(view.requires_parent_for_url());
        assert!(view.requires_parent_for_api());
        assert_eq!(view.parent_type(), Some(ObjectTypeId::DataApp));

        let execution = OBJECT_TYPES.iter().find(|t| t.id == ObjectTypeId::WorkflowInstance).unwrap();
        assert!(execution.requires_parent_for_url());
        assert!(!execution.requires_parent_for_api());

        let stream = OBJECT_TYPES.iter().find(|t| t.id == ObjectTypeId::Stream).unwrap();
        assert!(!stream.has_url());
        assert!(!stream.supports_share_with_self());
        assert!(!stream.supports_delete());
    }

    #[test]
    fn test_extract_reads_the_id_slot() {
        let id = "7f3c2a10-1b2d-4c0e-9f5a-0a0b0c0d0e0f";
        for object_type in OBJECT_TYPES.iter().filter(|t| t.has_url()) {
            let path = build_path(object_type.url_path.unwrap(), id, Some("55"));
            let segments: Vec<String> = format!("{}/history", path).split('/').map(String::from).collect();
            let config = object_type.extract.unwrap();
            let segments = match config {
                ExtractConfig::FromEnd(_) => &segments[..segments.len() - 1],
                ExtractConfig::Keyword { .. } => &segments[..],
            };
            assert_eq!(config.extract(segments), Some(id), "{}", object_type.id);
        }
    }

    #[test]
    fn test_api_recipe_with_body_template() {
        let approval = OBJECT_TYPES.iter().find(|t| t.id == ObjectTypeId::Approval).unwrap();
        let id = "7f3c2a10-1b2d-4c0e-9f5a-0a0b0c0d0e0f";
        let request = approval.metadata_api.unwrap().request(id, None).unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body.unwrap()["variables"]["id"], id);
    }

    #[test]
    fn test_api_recipe_requires_parent() {
        let view = OBJECT_TYPES.iter().find(|t| t.id == ObjectTypeId::DataAppView).unwrap();
        let recipe = view.metadata_api.unwrap();
        assert_eq!(recipe.request("9876", None), Err(ToolkitError::MissingParent));
        assert_eq!(
            recipe.request("9876", Some("55")).unwrap().path,
            "/api/content/v1/dataapps/55/views/9876"
        );
    }

    #[test]
    fn test_share_recipes_encode_type_specific_shapes() {
        let grant = ShareRecipe::DataSourceGrant.request("abc", "27").unwrap();
        assert_eq!(grant.path, "/api/data/v3/datasources/abc/share");
        assert_eq!(grant.body.unwrap()["permissions"][0]["id"], 27);

        let design = ShareRecipe::DesignPermission.request("abc", "27").unwrap();
        assert_eq!(design.path, "/domoapps/designs/abc/permissions/ADMIN");
        assert_eq!(design.body.unwrap(), json!([27]));

        let page = ShareRecipe::ContentRecipient { resource: "page" }.request("12345", "27").unwrap();
        let body = page.body.unwrap();
        assert_eq!(body["resources"][0]["id"], 12345);
        assert_eq!(body["recipients"][0]["id"], 27);
    }

    #[test]
    fn test_delete_recipes() {
        let plain = DeleteRecipe::Endpoint("/api/content/v1/pages/{id}").request("5", None).unwrap();
        assert_eq!(plain.method, Method::Delete);
        assert_eq!(plain.path, "/api/content/v1/pages/5");

        let bulk = DeleteRecipe::Bulk { endpoint: "/api/x/delete", field: "ids" }.request("5", None).unwrap();
        assert_eq!(bulk.method, Method::Post);
        assert_eq!(bulk.body.unwrap(), json!({"ids": [5]}));
    }
}
