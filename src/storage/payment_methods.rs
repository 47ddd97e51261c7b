//! Payment method repository for JSON storage
//!
//! Manages loading and saving payment methods to payment_methods.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::TallyError;
use crate::models::{PaymentMethod, PaymentMethodId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock, write_lock};

/// Serializable payment method data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct PaymentMethodData {
    payment_methods: Vec<PaymentMethod>,
}

/// Repository for payment method persistence
pub struct PaymentMethodRepository {
    path: PathBuf,
    data: RwLock<HashMap<PaymentMethodId, PaymentMethod>>,
}

impl PaymentMethodRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load payment methods from disk
    pub fn load(&self) -> Result<(), TallyError> {
        let file_data: PaymentMethodData = read_json(&self.path)?;

        let mut data = write_lock(&self.data)?;
        data.clear();
        for method in file_data.payment_methods {
            data.insert(method.id, method);
        }

        Ok(())
    }

    /// Save payment methods to disk
    pub fn save(&self) -> Result<(), TallyError> {
        let data = read_lock(&self.data)?;

        let mut payment_methods: Vec<_> = data.values().cloned().collect();
        payment_methods.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        write_json_atomic(&self.path, &PaymentMethodData { payment_methods })
    }

    pub fn get(&self, id: PaymentMethodId) -> Result<Option<PaymentMethod>, TallyError> {
        Ok(read_lock(&self.data)?.get(&id).cloned())
    }

    /// All payment methods, sorted by name
    pub fn get_all(&self) -> Result<Vec<PaymentMethod>, TallyError> {
        let data = read_lock(&self.data)?;

        let mut methods: Vec<_> = data.values().cloned().collect();
        methods.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(methods)
    }

    /// All payment methods that have not been retired
    pub fn get_active(&self) -> Result<Vec<PaymentMethod>, TallyError> {
        let all = self.get_all()?;
        Ok(all.into_iter().filter(|m| !m.is_deleted()).collect())
    }

    /// Get a payment method by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Result<Option<PaymentMethod>, TallyError> {
        let data = read_lock(&self.data)?;

        let name_lower = name.trim().to_lowercase();
        Ok(data
            .values()
            .find(|m| m.name.to_lowercase() == name_lower)
            .cloned())
    }

    /// Insert or update a payment method
    pub fn upsert(&self, method: PaymentMethod) -> Result<(), TallyError> {
        write_lock(&self.data)?.insert(method.id, method);
        Ok(())
    }

    pub fn remove(&self, id: PaymentMethodId) -> Result<Option<PaymentMethod>, TallyError> {
        Ok(write_lock(&self.data)?.remove(&id))
    }

    /// Check if a name is already taken, optionally ignoring one method
    pub fn name_exists(
        &self,
        name: &str,
        exclude_id: Option<PaymentMethodId>,
    ) -> Result<bool, TallyError> {
        let data = read_lock(&self.data)?;

        let name_lower = name.trim().to_lowercase();
        Ok(data
            .values()
            .any(|m| m.name.to_lowercase() == name_lower && Some(m.id) != exclude_id))
    }

    pub fn count(&self) -> Result<usize, TallyError> {
        Ok(read_lock(&self.data)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, PaymentMethodRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = PaymentMethodRepository::new(temp_dir.path().join("payment_methods.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let method = PaymentMethod::new("Bank");
        let id = method.id;

        repo.upsert(method).unwrap();
        repo.save().unwrap();

        let repo2 = PaymentMethodRepository::new(temp_dir.path().join("payment_methods.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.get(id).unwrap().unwrap().name, "Bank");
    }

    #[test]
    fn test_get_by_name_is_case_insensitive() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(PaymentMethod::new("GoPay")).unwrap();

        assert!(repo.get_by_name("gopay").unwrap().is_some());
        assert!(repo.get_by_name(" GOPAY ").unwrap().is_some());
        assert!(repo.get_by_name("ovo").unwrap().is_none());
    }

    #[test]
    fn test_get_active_filters_retired() {
        let (_temp_dir, repo) = create_test_repo();

        let active = PaymentMethod::new("Cash");
        let mut retired = PaymentMethod::new("Closed Bank");
        retired.retire();

        repo.upsert(active).unwrap();
        repo.upsert(retired).unwrap();

        assert_eq!(repo.get_all().unwrap().len(), 2);
        let active = repo.get_active().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Cash");
    }

    #[test]
    fn test_name_exists() {
        let (_temp_dir, repo) = create_test_repo();
        let method = PaymentMethod::new("Cash");
        let id = method.id;
        repo.upsert(method).unwrap();

        assert!(repo.name_exists("cash", None).unwrap());
        assert!(!repo.name_exists("cash", Some(id)).unwrap());
        assert!(!repo.name_exists("bank", None).unwrap());
    }
}
