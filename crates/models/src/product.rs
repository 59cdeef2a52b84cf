use sea_orm::{entity::prelude::*, ActiveValue::NotSet, IntoActiveModel, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{category, item, Record, Submission};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Product)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub version: i32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Category, Item }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Category => Entity::belongs_to(category::Entity)
                .from(Column::CategoryId)
                .to(category::Column::Id)
                .into(),
            Relation::Item => Entity::has_many(item::Entity).into(),
        }
    }
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef { Relation::Category.def() }
}

impl Related<item::Entity> for Entity {
    fn to() -> RelationDef { Relation::Item.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Record for Model {
    fn id(&self) -> i32 { self.id }
    fn version(&self) -> i32 { self.version }
}

/// Product as submitted on create/update. The category is referenced by id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(as = ProductPayload)]
pub struct Payload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i32>,
}

impl Submission for Payload {
    fn id(&self) -> Option<i32> { self.id }
    fn version(&self) -> Option<i32> { self.version }
}

impl IntoActiveModel<ActiveModel> for Payload {
    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            version: NotSet,
            name: Set(self.name),
            description: Set(self.description),
            category_id: Set(self.category_id),
        }
    }
}

/// Product as read back, with its category embedded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(as = ProductView)]
pub struct View {
    pub id: i32,
    pub version: i32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(inline)]
    pub category: Option<category::Model>,
}

impl View {
    pub fn from_parts(product: Model, category: Option<category::Model>) -> Self {
        Self {
            id: product.id,
            version: product.version,
            name: product.name,
            description: product.description,
            category_id: product.category_id,
            category,
        }
    }
}

impl Record for View {
    fn id(&self) -> i32 { self.id }
    fn version(&self) -> i32 { self.version }
}
