use sea_orm::{entity::prelude::*, ActiveValue::NotSet, IntoActiveModel, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{product, Record, Submission};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Item)]
#[sea_orm(table_name = "item")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub version: i32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    pub unit_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Product }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Product => Entity::belongs_to(product::Entity)
                .from(Column::ProductId)
                .to(product::Column::Id)
                .into(),
        }
    }
}

impl Related<product::Entity> for Entity {
    fn to() -> RelationDef { Relation::Product.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Record for Model {
    fn id(&self) -> i32 { self.id }
    fn version(&self) -> i32 { self.version }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(as = ItemPayload)]
pub struct Payload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    pub unit_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i32>,
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
            image_path: Set(self.image_path),
            unit_cost: Set(self.unit_cost),
            product_id: Set(self.product_id),
        }
    }
}

/// Item as read back, with its product embedded (the product's own category is not).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(as = ItemView)]
pub struct View {
    pub id: i32,
    pub version: i32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    pub unit_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(inline)]
    pub product: Option<product::Model>,
}

impl View {
    pub fn from_parts(item: Model, product: Option<product::Model>) -> Self {
        Self {
            id: item.id,
            version: item.version,
            name: item.name,
            description: item.description,
            image_path: item.image_path,
            unit_cost: item.unit_cost,
            product_id: item.product_id,
            product,
        }
    }
}

impl Record for View {
    fn id(&self) -> i32 { self.id }
    fn version(&self) -> i32 { self.version }
}
