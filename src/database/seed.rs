use tracing::{info, warn};

use crate::database::models::{Entity, Product, ProductInput, Store, StoreInput};
use crate::database::repository::Repository;

/// Demo catalogue loaded by `--seed`. Records are inserted as-is, without
/// request validation, so some prices sit above the API's own limit.
pub fn sample_products() -> Vec<Product> {
    [
        ("iPhone 17 pro MAX", "A new iPhone", "JP", 1499),
        ("MacBook Pro M4", "Power of m4 CPU", "USA", 3500),
        ("airPods Max v2", "Amazing sound", "EU", 700),
        ("iMac", "Nice PC", "USA", 899),
        ("apple TV", "Only sub use", "CH", 399),
    ]
    .into_iter()
    .map(|(title, description, country, price)| {
        Product::from_input(ProductInput {
            title: title.to_string(),
            description: description.to_string(),
            for_what_country: country.to_string(),
            price,
        })
    })
    .collect()
}

pub fn sample_stores() -> Vec<Store> {
    [
        ("TechnoDom", "Electronics retailer", "Some street in almaty", 3),
        ("iPoint", "Apple premium reseller", "Some street in almaty 2", 2),
        ("Sulpak", "Home appliances", "Some street in almaty 3", 7),
    ]
    .into_iter()
    .map(|(title, description, address, branches)| {
        Store::from_input(StoreInput {
            title: title.to_string(),
            description: description.to_string(),
            address: address.to_string(),
            coordinates: String::new(),
            number_of_branches: branches,
        })
    })
    .collect()
}

/// Insert `records` one by one. A failed insert is logged and skipped.
/// Returns how many records were stored.
pub async fn seed<T: Entity>(repo: &dyn Repository<T>, records: Vec<T>) -> usize {
    let mut stored = 0;
    for record in records {
        match repo.insert(record).await {
            Ok(_) => stored += 1,
            Err(e) => warn!(table = T::LIST.table, "Seed insert failed: {}", e),
        }
    }
    info!(table = T::LIST.table, "Seeded {} records", stored);
    stored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryRepository;

    #[tokio::test]
    async fn seeds_every_sample_record() {
        let repo = MemoryRepository::<Product>::new();
        assert_eq!(seed(&repo, sample_products()).await, 5);

        let first = repo.get(1).await.unwrap();
        assert_eq!(first.title, "iPhone 17 pro MAX");
        assert_eq!(first.price, 1499);
    }

    #[test]
    fn sample_stores_carry_branch_counts() {
        let branches: Vec<i32> = sample_stores().iter().map(|s| s.number_of_branches).collect();
        assert_eq!(branches, vec![3, 2, 7]);
    }
}
