//! Generic create/find/list/update/delete over any [`Resource`].

use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder,
};
use tracing::{debug, info, instrument, warn};

use models::{Record, Submission, INITIAL_VERSION};

use super::{DeleteOutcome, Lookup, Resource, UpdateOutcome};
use crate::{errors::ServiceError, metrics, pagination::Window};

fn failed<R: Resource>(operation: &'static str, err: DbErr) -> ServiceError {
    metrics::record(R::NAME, operation, "error");
    warn!(resource = R::NAME, operation, error = %err, "database error");
    err.into()
}

fn invalid<R: Resource>(operation: &'static str, msg: impl Into<String>) -> ServiceError {
    metrics::record(R::NAME, operation, "invalid");
    ServiceError::validation(msg)
}

async fn load_one<R, C>(db: &C, id: i32) -> Result<Option<R::View>, DbErr>
where
    R: Resource,
    C: ConnectionTrait,
{
    let query = R::Entity::find().filter(R::id_column().eq(id));
    Ok(R::fetch(db, query).await?.into_iter().next())
}

/// Insert a new record. The store assigns the id; the version starts at [`INITIAL_VERSION`].
/// Any id/version carried by the payload is ignored.
#[instrument(skip(db, payload), fields(resource = R::NAME))]
pub async fn create<R, C>(db: &C, payload: R::Payload) -> Result<R::Model, ServiceError>
where
    R: Resource,
    C: ConnectionTrait,
{
    let mut am: R::ActiveModel = payload.into_active_model();
    am.set(R::version_column(), INITIAL_VERSION.into());
    let model = am.insert(db).await.map_err(|e| failed::<R>("create", e))?;
    metrics::record(R::NAME, "create", "created");
    info!(id = model.id(), "created");
    Ok(model)
}

#[instrument(skip(db), fields(resource = R::NAME))]
pub async fn find_by_id<R, C>(db: &C, id: i32) -> Result<Lookup<R::View>, ServiceError>
where
    R: Resource,
    C: ConnectionTrait,
{
    let found = load_one::<R, C>(db, id).await.map_err(|e| failed::<R>("find", e))?;
    let outcome = if found.is_some() { "found" } else { "absent" };
    metrics::record(R::NAME, "find", outcome);
    Ok(found.into())
}

/// Records ordered by id ascending, windowed by `start`/`max`.
#[instrument(skip(db), fields(resource = R::NAME))]
pub async fn list_all<R, C>(db: &C, window: Window) -> Result<Vec<R::View>, ServiceError>
where
    R: Resource,
    C: ConnectionTrait,
{
    let query = window.apply(R::Entity::find().order_by_asc(R::id_column()));
    let rows = R::fetch(db, query).await.map_err(|e| failed::<R>("list", e))?;
    metrics::record(R::NAME, "list", "listed");
    debug!(count = rows.len(), "listed");
    Ok(rows)
}

/// Version-guarded update.
///
/// The write is a single `UPDATE .. SET .., version = version + 1 WHERE id = ? AND version = ?`,
/// so of several writers holding the same version exactly one succeeds. When no row
/// matches, the current record is read back to tell a stale version from a missing id.
#[instrument(skip(db, payload), fields(resource = R::NAME))]
pub async fn update<R, C>(db: &C, id: i32, payload: R::Payload) -> Result<UpdateOutcome<R::View>, ServiceError>
where
    R: Resource,
    C: ConnectionTrait,
{
    if let Some(body_id) = payload.id() {
        if body_id != id {
            return Err(invalid::<R>("update", format!("body id {body_id} does not match path id {id}")));
        }
    }
    let Some(expected) = payload.version() else {
        return Err(invalid::<R>("update", "version is required for update"));
    };

    let changes: R::ActiveModel = payload.into_active_model();
    let res = R::Entity::update_many()
        .set(changes)
        .col_expr(R::version_column(), Expr::col(R::version_column()).add(1))
        .filter(R::id_column().eq(id))
        .filter(R::version_column().eq(expected))
        .exec(db)
        .await
        .map_err(|e| failed::<R>("update", e))?;

    let current = load_one::<R, C>(db, id).await.map_err(|e| failed::<R>("update", e))?;
    match (res.rows_affected, current) {
        (0, Some(current)) => {
            metrics::record(R::NAME, "update", "conflict");
            warn!(id, expected, current = current.version(), "version conflict");
            Ok(UpdateOutcome::Conflict(current))
        }
        (_, Some(view)) => {
            metrics::record(R::NAME, "update", "updated");
            info!(id, version = view.version(), "updated");
            Ok(UpdateOutcome::Updated(view))
        }
        // deleted concurrently, or never existed
        (_, None) => {
            metrics::record(R::NAME, "update", "absent");
            Ok(UpdateOutcome::Absent)
        }
    }
}

#[instrument(skip(db), fields(resource = R::NAME))]
pub async fn delete_by_id<R, C>(db: &C, id: i32) -> Result<DeleteOutcome, ServiceError>
where
    R: Resource,
    C: ConnectionTrait,
{
    let res = R::Entity::delete_many()
        .filter(R::id_column().eq(id))
        .exec(db)
        .await
        .map_err(|e| failed::<R>("delete", e))?;
    if res.rows_affected == 0 {
        metrics::record(R::NAME, "delete", "absent");
        return Ok(DeleteOutcome::Absent);
    }
    metrics::record(R::NAME, "delete", "deleted");
    info!(id, "deleted");
    Ok(DeleteOutcome::Deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Categories;
    use std::sync::Arc;
    use tokio::sync::Barrier;

    use crate::test_support::{get_db, get_pooled_db};
    use models::category;

    fn payload(name: &str) -> category::Payload {
        category::Payload { name: name.into(), ..Default::default() }
    }

    fn versioned(id: i32, version: i32, name: &str) -> category::Payload {
        category::Payload { id: Some(id), version: Some(version), name: name.into(), description: None }
    }

    #[tokio::test]
    async fn create_assigns_id_and_initial_version() -> anyhow::Result<()> {
        let db = get_db().await?;
        let mut p = payload("Fish");
        p.id = Some(99);
        p.version = Some(7);
        let created = create::<Categories, _>(&db, p).await?;
        assert_eq!(created.id, 1);
        assert_eq!(created.version, INITIAL_VERSION);
        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_reports_absence() -> anyhow::Result<()> {
        let db = get_db().await?;
        let found = find_by_id::<Categories, _>(&db, 42).await?;
        assert_eq!(found, Lookup::Absent);
        Ok(())
    }

    #[tokio::test]
    async fn list_all_orders_by_id_and_windows() -> anyhow::Result<()> {
        let db = get_db().await?;
        for name in ["a", "b", "c", "d", "e"] {
            create::<Categories, _>(&db, payload(name)).await?;
        }
        let all = list_all::<Categories, _>(&db, Window::default()).await?;
        assert_eq!(all.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);

        let page = list_all::<Categories, _>(&db, Window::new(Some(2), Some(1))).await?;
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, 3);

        let tail = list_all::<Categories, _>(&db, Window::new(Some(3), None)).await?;
        assert_eq!(tail.iter().map(|c| c.id).collect::<Vec<_>>(), vec![4, 5]);

        let past_end = list_all::<Categories, _>(&db, Window::new(Some(10), Some(3))).await?;
        assert!(past_end.is_empty());

        let far = list_all::<Categories, _>(&db, Window::new(Some(u64::MAX), None)).await?;
        assert!(far.is_empty());
        let everything = list_all::<Categories, _>(&db, Window::new(None, Some(u64::MAX))).await?;
        assert_eq!(everything.len(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn update_with_current_version_increments_it() -> anyhow::Result<()> {
        let db = get_db().await?;
        let c = create::<Categories, _>(&db, payload("Fish")).await?;
        let out = update::<Categories, _>(&db, c.id, versioned(c.id, c.version, "Fishes")).await?;
        let UpdateOutcome::Updated(v) = out else { panic!("expected update, got {out:?}") };
        assert_eq!(v.version, c.version + 1);
        assert_eq!(v.name, "Fishes");
        Ok(())
    }

    #[tokio::test]
    async fn stale_version_conflicts_with_stored_state() -> anyhow::Result<()> {
        let db = get_db().await?;
        let c = create::<Categories, _>(&db, payload("Fish")).await?;
        update::<Categories, _>(&db, c.id, versioned(c.id, 1, "first")).await?;

        let out = update::<Categories, _>(&db, c.id, versioned(c.id, 1, "second")).await?;
        let UpdateOutcome::Conflict(current) = out else { panic!("expected conflict, got {out:?}") };
        assert_eq!(current.version, 2);
        assert_eq!(current.name, "first");

        let stored = find_by_id::<Categories, _>(&db, c.id).await?.into_option().expect("stored");
        assert_eq!(stored.name, "first");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_on_one_version_let_exactly_one_win() -> anyhow::Result<()> {
        const WRITERS: usize = 8;
        let (db, path) = get_pooled_db(WRITERS as u32).await?;
        let id = create::<Categories, _>(&db, payload("Fish")).await?.id;

        let barrier = Arc::new(Barrier::new(WRITERS));
        let tasks: Vec<_> = (0..WRITERS)
            .map(|n| {
                let db = db.clone();
                let barrier = barrier.clone();
                tokio::spawn(async move {
                    barrier.wait().await;
                    update::<Categories, _>(&db, id, versioned(id, 1, &format!("writer-{n}"))).await
                })
            })
            .collect();
        let mut outcomes = Vec::with_capacity(WRITERS);
        for t in tasks {
            outcomes.push(t.await??);
        }
        let won = outcomes.iter().filter(|o| matches!(o, UpdateOutcome::Updated(_))).count();
        let lost = outcomes.iter().filter(|o| matches!(o, UpdateOutcome::Conflict(_))).count();
        assert_eq!((won, lost), (1, WRITERS - 1));

        let stored = find_by_id::<Categories, _>(&db, id).await?.into_option().expect("stored");
        assert_eq!(stored.version, 2);
        for o in &outcomes {
            if let UpdateOutcome::Conflict(current) = o {
                assert_eq!(current.version, 2);
            }
        }
        drop(db);
        let _ = std::fs::remove_file(path);
        Ok(())
    }

    #[tokio::test]
    async fn update_of_missing_id_is_absent() -> anyhow::Result<()> {
        let db = get_db().await?;
        let out = update::<Categories, _>(&db, 5, versioned(5, 1, "ghost")).await?;
        assert_eq!(out, UpdateOutcome::Absent);
        Ok(())
    }

    #[tokio::test]
    async fn update_rejects_mismatched_id_and_missing_version() -> anyhow::Result<()> {
        let db = get_db().await?;
        let c = create::<Categories, _>(&db, payload("Fish")).await?;

        let err = update::<Categories, _>(&db, c.id, versioned(c.id + 1, 1, "x")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let mut no_version = payload("x");
        no_version.id = Some(c.id);
        let err = update::<Categories, _>(&db, c.id, no_version).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        // body without id is accepted; the path id is used
        let mut no_id = payload("y");
        no_id.version = Some(1);
        let out = update::<Categories, _>(&db, c.id, no_id).await?;
        assert!(matches!(out, UpdateOutcome::Updated(_)));
        Ok(())
    }

    #[tokio::test]
    async fn delete_is_not_idempotent() -> anyhow::Result<()> {
        let db = get_db().await?;
        let c = create::<Categories, _>(&db, payload("Fish")).await?;
        assert_eq!(delete_by_id::<Categories, _>(&db, c.id).await?, DeleteOutcome::Deleted);
        assert_eq!(delete_by_id::<Categories, _>(&db, c.id).await?, DeleteOutcome::Absent);
        assert!(find_by_id::<Categories, _>(&db, c.id).await?.is_absent());
        Ok(())
    }

    #[tokio::test]
    async fn outcomes_are_counted() -> anyhow::Result<()> {
        let db = get_db().await?;
        let before = metrics::count("category", "find", "absent");
        find_by_id::<Categories, _>(&db, 1000).await?;
        assert!(metrics::count("category", "find", "absent") > before);
        Ok(())
    }
}
