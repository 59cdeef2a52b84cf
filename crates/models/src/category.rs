use sea_orm::{entity::prelude::*, ActiveValue::NotSet, IntoActiveModel, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{product, Record, Submission};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Category)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub version: i32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Product }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Product => Entity::has_many(product::Entity).into(),
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

/// Category as submitted on create/update.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(as = CategoryPayload)]
pub struct Payload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Submission for Payload {
    fn id(&self) -> Option<i32> { self.id }
    fn version(&self) -> Option<i32> { self.version }
}

/// Data columns only; `id` and `version` are owned by the store.
impl IntoActiveModel<ActiveModel> for Payload {
    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            version: NotSet,
            name: Set(self.name),
            description: Set(self.description),
        }
    }
}
