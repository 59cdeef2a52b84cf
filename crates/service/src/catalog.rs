//! The catalog's resource descriptors.

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DbErr, Select};

use models::{category, item, product};

use crate::resource::Resource;

pub struct Categories;
pub struct Products;
pub struct Items;

#[async_trait]
impl Resource for Categories {
    type Entity = category::Entity;
    type Model = category::Model;
    type ActiveModel = category::ActiveModel;
    type Column = category::Column;
    type Payload = category::Payload;
    type View = category::Model;

    const NAME: &'static str = "category";
    const COLLECTION: &'static str = "categories";

    fn id_column() -> category::Column { category::Column::Id }
    fn version_column() -> category::Column { category::Column::Version }

    async fn fetch<C>(db: &C, query: Select<Self::Entity>) -> Result<Vec<Self::View>, DbErr>
    where
        C: ConnectionTrait,
    {
        query.all(db).await
    }
}

/// Products read back with their category (LEFT JOIN, so a product without one still lists).
#[async_trait]
impl Resource for Products {
    type Entity = product::Entity;
    type Model = product::Model;
    type ActiveModel = product::ActiveModel;
    type Column = product::Column;
    type Payload = product::Payload;
    type View = product::View;

    const NAME: &'static str = "product";
    const COLLECTION: &'static str = "products";

    fn id_column() -> product::Column { product::Column::Id }
    fn version_column() -> product::Column { product::Column::Version }

    async fn fetch<C>(db: &C, query: Select<Self::Entity>) -> Result<Vec<Self::View>, DbErr>
    where
        C: ConnectionTrait,
    {
        let rows = query.find_also_related(category::Entity).all(db).await?;
        Ok(rows.into_iter().map(|(p, c)| product::View::from_parts(p, c)).collect())
    }
}

/// Items read back with their product, one level deep.
#[async_trait]
impl Resource for Items {
    type Entity = item::Entity;
    type Model = item::Model;
    type ActiveModel = item::ActiveModel;
    type Column = item::Column;
    type Payload = item::Payload;
    type View = item::View;

    const NAME: &'static str = "item";
    const COLLECTION: &'static str = "items";

    fn id_column() -> item::Column { item::Column::Id }
    fn version_column() -> item::Column { item::Column::Version }

    async fn fetch<C>(db: &C, query: Select<Self::Entity>) -> Result<Vec<Self::View>, DbErr>
    where
        C: ConnectionTrait,
    {
        let rows = query.find_also_related(product::Entity).all(db).await?;
        Ok(rows.into_iter().map(|(i, p)| item::View::from_parts(i, p)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::Window;
    use crate::resource::{crud, Lookup};
    use crate::test_support::get_db;

    fn category(name: &str) -> category::Payload {
        category::Payload { name: name.into(), ..Default::default() }
    }

    #[tokio::test]
    async fn product_view_embeds_category() -> anyhow::Result<()> {
        let db = get_db().await?;
        let fish = crud::create::<Categories, _>(&db, category("Fish")).await?;
        let p = crud::create::<Products, _>(
            &db,
            product::Payload { name: "Angelfish".into(), category_id: Some(fish.id), ..Default::default() },
        )
        .await?;

        let Lookup::Found(view) = crud::find_by_id::<Products, _>(&db, p.id).await? else {
            panic!("product not found");
        };
        assert_eq!(view.category_id, Some(fish.id));
        assert_eq!(view.category.as_ref().map(|c| c.name.as_str()), Some("Fish"));
        Ok(())
    }

    #[tokio::test]
    async fn product_without_category_is_listed() -> anyhow::Result<()> {
        let db = get_db().await?;
        crud::create::<Products, _>(&db, product::Payload { name: "Orphan".into(), ..Default::default() }).await?;
        let all = crud::list_all::<Products, _>(&db, Window::default()).await?;
        assert_eq!(all.len(), 1);
        assert!(all[0].category.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn item_view_embeds_product_one_level() -> anyhow::Result<()> {
        let db = get_db().await?;
        let fish = crud::create::<Categories, _>(&db, category("Fish")).await?;
        let p = crud::create::<Products, _>(
            &db,
            product::Payload { name: "Koi".into(), category_id: Some(fish.id), ..Default::default() },
        )
        .await?;
        let i = crud::create::<Items, _>(
            &db,
            item::Payload {
                name: "Spotted Koi".into(),
                unit_cost: 12.5,
                image_path: Some("fish3.gif".into()),
                product_id: Some(p.id),
                ..Default::default()
            },
        )
        .await?;

        let view = crud::find_by_id::<Items, _>(&db, i.id).await?.into_option().expect("item");
        let product = view.product.expect("embedded product");
        assert_eq!(product.name, "Koi");
        assert_eq!(product.category_id, Some(fish.id));
        assert_eq!(view.unit_cost, 12.5);

        let json = serde_json::to_value(&crud::find_by_id::<Items, _>(&db, i.id).await?.into_option())?;
        assert!(json["product"].get("category").is_none());
        Ok(())
    }
}
