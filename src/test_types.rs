//! Target types shared by the unit tests, modelled on the GitHub API.

use serde::Serialize;
use serde_json::Value;

use crate::{Error, FieldShape, GraphQLObject, Id, Materialize, Materializer, ShapeBuilder, Slot, TypeRef};

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Language {
    pub name: String,
    pub color: Option<String>,
}

impl GraphQLObject for Language {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<String>("name");
        shape.field::<Option<String>>("color");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "name" => Some(&mut self.name),
            "color" => Some(&mut self.color),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub name_with_owner: String,
    pub stargazer_count: i64,
    pub primary_language: Option<Language>,
}

impl GraphQLObject for Repository {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<String>("name_with_owner");
        shape.field::<i64>("stargazer_count");
        shape.field::<Option<Language>>("primary_language");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "name_with_owner" => Some(&mut self.name_with_owner),
            "stargazer_count" => Some(&mut self.stargazer_count),
            "primary_language" => Some(&mut self.primary_language),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RepositoryNode {
    pub name: String,
}

impl GraphQLObject for RepositoryNode {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<String>("name");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "name" => Some(&mut self.name),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RepositoryConnection {
    pub nodes: Vec<RepositoryNode>,
}

impl GraphQLObject for RepositoryConnection {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<Vec<RepositoryNode>>("nodes");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "nodes" => Some(&mut self.nodes),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Viewer {
    pub name: String,
    pub repositories: RepositoryConnection,
}

impl GraphQLObject for Viewer {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<String>("name");
        shape
            .field::<RepositoryConnection>("repositories")
            .tag("repositories(first: $n)");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "name" => Some(&mut self.name),
            "repositories" => Some(&mut self.repositories),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ViewerQuery {
    pub viewer: Viewer,
}

impl GraphQLObject for ViewerQuery {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<Viewer>("viewer");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "viewer" => Some(&mut self.viewer),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct UserOwner {
    pub name: Option<String>,
    pub bio: Option<String>,
}

impl GraphQLObject for UserOwner {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<Option<String>>("name");
        shape.field::<Option<String>>("bio");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "name" => Some(&mut self.name),
            "bio" => Some(&mut self.bio),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TotalCount {
    pub total_count: i64,
}

impl GraphQLObject for TotalCount {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<i64>("total_count");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "total_count" => Some(&mut self.total_count),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct OrganizationOwner {
    pub members: TotalCount,
}

impl GraphQLObject for OrganizationOwner {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<TotalCount>("members").tag("members: membersWithRole");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "members" => Some(&mut self.members),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub enum OwnerKind {
    #[default]
    Unknown,
    User(UserOwner),
    Organization(OrganizationOwner),
}

/// The `RepositoryOwner` interface.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Owner {
    pub login: String,
    pub kind: OwnerKind,
}

impl GraphQLObject for Owner {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<String>("login");
        shape.fragment::<UserOwner>("User");
        shape.fragment::<OrganizationOwner>("Organization");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "login" => Some(&mut self.login),
            _ => None,
        }
    }

    fn fragment_mut(&mut self, type_condition: &str) -> Option<&mut dyn Slot> {
        match type_condition {
            "User" => {
                if !matches!(self.kind, OwnerKind::User(_)) {
                    self.kind = OwnerKind::User(UserOwner::default());
                }
            }
            "Organization" => {
                if !matches!(self.kind, OwnerKind::Organization(_)) {
                    self.kind = OwnerKind::Organization(OrganizationOwner::default());
                }
            }
            _ => return None,
        }
        match &mut self.kind {
            OwnerKind::User(user) => Some(user),
            OwnerKind::Organization(organization) => Some(organization),
            OwnerKind::Unknown => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Node {
    pub id: Id,
    pub tags: Vec<String>,
    pub owner: Option<Owner>,
}

impl GraphQLObject for Node {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<Id>("id");
        shape.field::<Vec<String>>("tags").alias("tags").name("topics");
        shape.field::<Option<Owner>>("owner");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "id" => Some(&mut self.id),
            "tags" => Some(&mut self.tags),
            "owner" => Some(&mut self.owner),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct NodeQuery {
    pub node: Option<Node>,
}

impl GraphQLObject for NodeQuery {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<Option<Node>>("node").tag("node(id: $id)");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "node" => Some(&mut self.node),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Labels {
    pub names: Option<Vec<String>>,
}

impl GraphQLObject for Labels {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<Option<Vec<String>>>("names");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "names" => Some(&mut self.names),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AppAccount {
    pub avatar_url: String,
}

impl GraphQLObject for AppAccount {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<String>("avatar_url");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "avatar_url" => Some(&mut self.avatar_url),
            _ => None,
        }
    }
}

/// The `Actor` interface, sharing the owner selections.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Actor {
    pub owner: Owner,
    pub app: AppAccount,
}

impl GraphQLObject for Actor {
    fn describe(shape: &mut ShapeBuilder) {
        shape.embed::<Owner>("owner");
        shape.fragment::<AppAccount>("Bot");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "owner" => Some(&mut self.owner),
            _ => None,
        }
    }

    fn fragment_mut(&mut self, type_condition: &str) -> Option<&mut dyn Slot> {
        match type_condition {
            "Bot" => Some(&mut self.app),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Headline {
    pub name: String,
}

impl GraphQLObject for Headline {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<String>("name");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "name" => Some(&mut self.name),
            _ => None,
        }
    }
}

/// Aliases `title` to a key its embedded `Headline` also selects.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClashingEmbed {
    pub title: String,
    pub headline: Headline,
}

impl GraphQLObject for ClashingEmbed {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<String>("title").tag("name: title");
        shape.embed::<Headline>("headline");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "title" => Some(&mut self.title),
            "headline" => Some(&mut self.headline),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClashingAliases {
    pub login: String,
    pub name: String,
}

impl GraphQLObject for ClashingAliases {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<String>("login");
        shape.field::<String>("name").alias("login");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "login" => Some(&mut self.login),
            "name" => Some(&mut self.name),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Timestamps {
    pub created_at: String,
    pub updated_at: String,
}

impl GraphQLObject for Timestamps {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<String>("created_at");
        shape.field::<String>("updated_at");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "created_at" => Some(&mut self.created_at),
            "updated_at" => Some(&mut self.updated_at),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Issue {
    pub number: i64,
    pub timestamps: Timestamps,
    pub title: String,
}

impl GraphQLObject for Issue {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<i64>("number");
        shape.embed::<Timestamps>("timestamps");
        shape.field::<String>("title");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "number" => Some(&mut self.number),
            "timestamps" => Some(&mut self.timestamps),
            "title" => Some(&mut self.title),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct IssueRepository {
    pub issue: Option<Issue>,
}

impl GraphQLObject for IssueRepository {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<Option<Issue>>("issue").tag("issue(number: $number)");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "issue" => Some(&mut self.issue),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct IssueQuery {
    pub repository: IssueRepository,
}

impl GraphQLObject for IssueQuery {
    fn describe(shape: &mut ShapeBuilder) {
        shape
            .field::<IssueRepository>("repository")
            .tag(r#"repository(owner: "rust-lang", name: "rust")"#);
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "repository" => Some(&mut self.repository),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct UpdateRepositoryPayload {
    pub repository: RepositoryNode,
}

impl GraphQLObject for UpdateRepositoryPayload {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<RepositoryNode>("repository");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "repository" => Some(&mut self.repository),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenameRepository {
    pub update_repository: UpdateRepositoryPayload,
}

impl GraphQLObject for RenameRepository {
    fn describe(shape: &mut ShapeBuilder) {
        shape
            .field::<UpdateRepositoryPayload>("update_repository")
            .tag("updateRepository(input: {repositoryId: $id, name: $name, hasWikiEnabled: false})");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "update_repository" => Some(&mut self.update_repository),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub parent: Option<Box<Category>>,
}

impl GraphQLObject for Category {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<String>("name");
        shape.field::<Option<Box<Category>>>("parent");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "name" => Some(&mut self.name),
            "parent" => Some(&mut self.parent),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CategoryQuery {
    pub category: Option<Category>,
}

impl GraphQLObject for CategoryQuery {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<Option<Category>>("category");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "category" => Some(&mut self.category),
            _ => None,
        }
    }
}

/// Contains itself with nothing nullable in between.
#[derive(Debug, Default)]
pub struct Chain {
    pub next: Link,
}

/// Lazily allocated so `Chain::default()` terminates; reports the shape of a
/// plain `Chain`.
#[derive(Debug, Default)]
pub struct Link(pub Option<Box<Chain>>);

impl Materialize for Link {
    fn shape() -> FieldShape {
        FieldShape::Object(TypeRef::of::<Chain>())
    }

    fn materialize(&mut self, value: &Value, cx: &mut Materializer<'_>) -> Result<(), Error> {
        let chain = self.0.get_or_insert_with(Box::default);
        cx.object(chain.as_mut(), value)
    }
}

impl GraphQLObject for Chain {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<Link>("next");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "next" => Some(&mut self.next),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Empty {}

impl GraphQLObject for Empty {
    fn describe(_: &mut ShapeBuilder) {}

    fn field_mut(&mut self, _: &str) -> Option<&mut dyn Slot> {
        None
    }
}

#[derive(Debug, Default)]
pub struct WithEmpty {
    pub empty: Empty,
}

impl GraphQLObject for WithEmpty {
    fn describe(shape: &mut ShapeBuilder) {
        shape.field::<Empty>("empty");
    }

    fn field_mut(&mut self, ident: &str) -> Option<&mut dyn Slot> {
        match ident {
            "empty" => Some(&mut self.empty),
            _ => None,
        }
    }
}

crate::graphql_object!(
    Language,
    Repository,
    RepositoryNode,
    RepositoryConnection,
    Viewer,
    ViewerQuery,
    UserOwner,
    TotalCount,
    OrganizationOwner,
    Owner,
    Node,
    NodeQuery,
    Labels,
    AppAccount,
    Actor,
    Headline,
    ClashingEmbed,
    ClashingAliases,
    Timestamps,
    Issue,
    IssueRepository,
    IssueQuery,
    UpdateRepositoryPayload,
    RenameRepository,
    Category,
    CategoryQuery,
    Chain,
    Empty,
    WithEmpty,
);
