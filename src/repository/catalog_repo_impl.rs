// ==========================================
// Meat Production Analytics - product catalog repository (rusqlite)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::catalog::{ProductCatalogEntry, ReferenceNames};
use crate::repository::catalog_repo::ProductCatalog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct ProductCatalogRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ProductCatalogRepositoryImpl {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

// Lower-cased name and Hebrew name -> id
fn load_name_map(conn: &Connection, sql: &str) -> RepositoryResult<HashMap<String, i64>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, Option<String>>(1)?,
                r.get::<_, Option<String>>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut map = HashMap::new();
    for (id, name, name_hebrew) in rows {
        for n in [name, name_hebrew].into_iter().flatten() {
            let key = n.trim().to_lowercase();
            if !key.is_empty() {
                map.insert(key, id);
            }
        }
    }
    Ok(map)
}

#[async_trait]
impl ProductCatalog for ProductCatalogRepositoryImpl {
    async fn lookup_existing_item_ids(&self, item_ids: &[String]) -> RepositoryResult<HashSet<String>> {
        if item_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let conn = self.get_conn()?;
        let placeholders = vec!["?"; item_ids.len()].join(", ");
        let sql = format!(
            "SELECT item_id FROM products WHERE item_id IN ({})",
            placeholders
        );
        let mut stmt = conn.prepare(&sql)?;
        let found = stmt
            .query_map(params_from_iter(item_ids.iter()), |r| r.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(found)
    }

    async fn load_reference_names(&self) -> RepositoryResult<ReferenceNames> {
        let conn = self.get_conn()?;
        Ok(ReferenceNames {
            kosher: load_name_map(&conn, "SELECT id, name, name_hebrew FROM kosher_families")?,
            customers: load_name_map(
                &conn,
                "SELECT id, name, name_hebrew FROM customers WHERE active = 1",
            )?,
        })
    }

    async fn insert_product_if_absent(&self, entry: &ProductCatalogEntry) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let n = conn.execute(
            r#"
            INSERT INTO products (
                item_id, name_foreign, name_hebrew, department, freshness, breed,
                is_anatomical, is_steak, kosher_id, customer_id, bone_waste_percentage, active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 1)
            ON CONFLICT (item_id) DO NOTHING
            "#,
            params![
                entry.item_id,
                entry.name_foreign,
                entry.name_hebrew,
                entry.department,
                entry.freshness,
                entry.breed,
                entry.is_anatomical,
                entry.is_steak,
                entry.kosher_id,
                entry.customer_id,
                entry.bone_waste_percentage,
            ],
        )?;
        Ok(n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};

    fn setup() -> ProductCatalogRepositoryImpl {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO kosher_families (id, name, family, name_hebrew) VALUES (1, 'Halak', 'Halak', 'חלק');
             INSERT INTO customers (id, name, active) VALUES (3, 'ACME', 1), (4, 'Gone', 0);
             INSERT INTO products (item_id, name_hebrew, kosher_id) VALUES ('A1', 'x', 1), ('A2', 'y', 1);",
        )
        .unwrap();
        ProductCatalogRepositoryImpl::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[tokio::test]
    async fn test_lookup_existing() {
        let repo = setup();
        let ids = vec!["A1".to_string(), "B9".to_string(), "A2".to_string()];
        let found = repo.lookup_existing_item_ids(&ids).await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.contains("A1") && found.contains("A2"));
        assert!(repo.lookup_existing_item_ids(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reference_names_skip_inactive_customers() {
        let repo = setup();
        let refs = repo.load_reference_names().await.unwrap();
        assert_eq!(refs.kosher_id("HALAK"), Some(1));
        assert_eq!(refs.kosher_id("חלק"), Some(1));
        assert_eq!(refs.customer_id("acme"), Some(3));
        assert_eq!(refs.customer_id("gone"), None);
    }

    #[tokio::test]
    async fn test_insert_if_absent() {
        let repo = setup();
        let entry = ProductCatalogEntry {
            item_id: "A1".to_string(),
            name_hebrew: "z".to_string(),
            name_foreign: None,
            kosher_id: 1,
            department: None,
            is_anatomical: true,
            is_steak: false,
            freshness: Some("fresh".to_string()),
            breed: None,
            bone_waste_percentage: None,
            customer_id: None,
        };
        assert!(!repo.insert_product_if_absent(&entry).await.unwrap());
        let fresh = ProductCatalogEntry { item_id: "A3".to_string(), ..entry };
        assert!(repo.insert_product_if_absent(&fresh).await.unwrap());
    }
}
