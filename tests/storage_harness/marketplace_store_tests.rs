//! Macro-generated test suite for `MarketplaceStore` contract validation.
//!
//! The `marketplace_store_tests!` macro generates a test module that drives a
//! store through `BusinessDirectory`, so every backend is checked against the
//! same listing, search, detail, analytics and write behaviour.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use knust_hub::storage::InMemoryMarketplaceStore;
//!
//! marketplace_store_tests!(InMemoryMarketplaceStore::new());
//! ```
//!
//! # Generated Tests
//!
//! ## Listing
//! - `test_listing_aggregates`: product count, average rating and review count
//! - `test_listing_without_reviews`: no average, zero counts
//! - `test_listing_filters`: category, location and search combine with AND
//! - `test_listing_excludes_inactive`: soft-deleted rows are invisible
//! - `test_pagination_meta`: totals and flags across pages
//! - `test_page_beyond_range`: empty items, real totals
//! - `test_huge_page_number`: offsets past `i64::MAX` still yield an empty page
//! - `test_listing_store_failure`: store errors surface as `Storage`
//! - `test_recency_order`: newest first
//!
//! ## Search
//! - `test_ranked_search`: name matches before description-only matches
//! - `test_search_escapes_wildcards`: `%` and `_` match literally
//!
//! ## Detail & analytics
//! - `test_detail`: available products only, reviews with authors
//! - `test_detail_not_found`: unknown and inactive ids
//! - `test_analytics_report`: totals, statuses, top products, daily series
//! - `test_analytics_empty`: zeros and empty lists
//! - `test_top_products_cap_and_ties`: five rows, ties ordered by product id
//! - `test_analytics_fails_as_a_whole`: one failing sub-query fails the report
//!
//! ## Writes
//! - `test_create_business_rules`: unknown owner, one active business per owner
//! - `test_update_and_delete_ownership`: non-owners are forbidden
//! - `test_racing_registration_is_conflict`: the store's own rule maps to `Conflict`

/// Generate a full `MarketplaceStore` conformance test suite.
///
/// `$factory` must evaluate to an empty store implementing `SeedStore`. It is
/// re-evaluated for each test to ensure isolation.
#[macro_export]
macro_rules! marketplace_store_tests {
    ($factory:expr) => {
        mod marketplace_store_contract_tests {
            use super::*;
            use chrono::Duration;
            use knust_hub::core::error::HubError;
            use knust_hub::core::filter::FilterCriteria;
            use knust_hub::core::model::{BusinessPatch, NewBusiness};
            use knust_hub::core::pagination::{PageParams, PageRequest};
            use uuid::Uuid;

            fn criteria(
                category: Option<&str>,
                location: Option<&str>,
                search: Option<&str>,
            ) -> FilterCriteria {
                FilterCriteria {
                    category: category.map(str::to_string),
                    location: location.map(str::to_string),
                    search: search.map(str::to_string),
                }
            }

            fn names(items: &[knust_hub::core::model::BusinessSummary]) -> Vec<String> {
                items.iter().map(|s| s.business.name.clone()).collect()
            }

            // ==================================================================
            // Listing
            // ==================================================================

            #[tokio::test]
            async fn test_listing_aggregates() {
                let store = $factory;
                let (owner, x) =
                    seed_owned_business(&store, "Ama", "Ama's Kitchen", "Jollof and waakye", 5)
                        .await;

                let p1 = product(&x, "Jollof", true);
                let p2 = product(&x, "Waakye", false);
                store.seed_product(&p1).await.unwrap();
                store.seed_product(&p2).await.unwrap();

                for (i, rating) in [5, 4, 3].into_iter().enumerate() {
                    let author = user(&format!("Reviewer{}", i));
                    store.seed_user(&author).await.unwrap();
                    store
                        .seed_review(&review(&x, &author, rating, i as i64))
                        .await
                        .unwrap();
                }

                let page = directory_for(&store)
                    .list_businesses(FilterCriteria::default(), PageRequest::new(1, 10))
                    .await
                    .unwrap();

                assert_eq!(page.items.len(), 1);
                let summary = &page.items[0];
                assert_eq!(summary.product_count, 2);
                assert_eq!(summary.review_count, 3);
                assert_eq!(summary.average_rating, Some(4.0));
                assert_eq!(summary.owner_first_name.as_deref(), Some(owner.first_name.as_str()));
                assert_eq!(summary.owner_last_name.as_deref(), Some("Owusu"));
            }

            #[tokio::test]
            async fn test_listing_without_reviews() {
                let store = $factory;
                seed_owned_business(&store, "Kojo", "Kojo Prints", "T-shirt printing", 1).await;

                let page = directory_for(&store)
                    .list_businesses(FilterCriteria::default(), PageRequest::new(1, 10))
                    .await
                    .unwrap();

                let summary = &page.items[0];
                assert_eq!(summary.average_rating, None);
                assert_eq!(summary.review_count, 0);
                assert_eq!(summary.product_count, 0);
            }

            #[tokio::test]
            async fn test_listing_filters() {
                let store = $factory;
                seed_owned_business(&store, "Abena", "Abena Eats", "Fried rice", 3).await;

                let owner = user("Yaw");
                store.seed_user(&owner).await.unwrap();
                let mut tech = business_aged(&owner, "Yaw Repairs", "Phone and laptop repair", 2);
                tech.category = "Electronics".to_string();
                tech.location = "Kotei".to_string();
                store.seed_business(&tech).await.unwrap();

                let owner = user("Efua");
                store.seed_user(&owner).await.unwrap();
                let mut kotei_food = business_aged(&owner, "Efua Snacks", "Pastries", 1);
                kotei_food.location = "Kotei".to_string();
                store.seed_business(&kotei_food).await.unwrap();

                let directory = directory_for(&store);
                let page = PageRequest::new(1, 10);

                let by_category = directory
                    .list_businesses(criteria(Some("Food"), None, None), page)
                    .await
                    .unwrap();
                assert_eq!(names(&by_category.items), vec!["Efua Snacks", "Abena Eats"]);
                assert_eq!(by_category.pagination.total_count, 2);

                let both = directory
                    .list_businesses(criteria(Some("Food"), Some("Kotei"), None), page)
                    .await
                    .unwrap();
                assert_eq!(names(&both.items), vec!["Efua Snacks"]);

                // Case-insensitive, matches description as well as name
                let laptop = directory
                    .list_businesses(criteria(None, None, Some("LAPTOP")), page)
                    .await
                    .unwrap();
                assert_eq!(names(&laptop.items), vec!["Yaw Repairs"]);

                // Category is exact and case-sensitive
                let lower = directory
                    .list_businesses(criteria(Some("food"), None, None), page)
                    .await
                    .unwrap();
                assert!(lower.items.is_empty());
                assert_eq!(lower.pagination.total_count, 0);

                // Blank filters are ignored
                let blank = directory
                    .list_businesses(criteria(Some("  "), Some(""), Some(" ")), page)
                    .await
                    .unwrap();
                assert_eq!(blank.pagination.total_count, 3);
            }

            #[tokio::test]
            async fn test_listing_excludes_inactive() {
                let store = $factory;
                seed_owned_business(&store, "Kwesi", "Open Shop", "Open", 2).await;
                let owner = user("Adwoa");
                store.seed_user(&owner).await.unwrap();
                let mut closed = business_aged(&owner, "Closed Shop", "Closed", 1);
                closed.is_active = false;
                store.seed_business(&closed).await.unwrap();

                let page = directory_for(&store)
                    .list_businesses(FilterCriteria::default(), PageRequest::new(1, 10))
                    .await
                    .unwrap();
                assert_eq!(names(&page.items), vec!["Open Shop"]);
                assert_eq!(page.pagination.total_count, 1);
            }

            #[tokio::test]
            async fn test_pagination_meta() {
                let store = $factory;
                for i in 0..25 {
                    seed_owned_business(&store, "Owner", &format!("Shop {:02}", i), "Goods", i)
                        .await;
                }
                let directory = directory_for(&store);

                let first = directory
                    .list_businesses(FilterCriteria::default(), PageRequest::new(1, 10))
                    .await
                    .unwrap();
                assert_eq!(first.items.len(), 10);
                assert_eq!(first.pagination.total_pages, 3);
                assert_eq!(first.pagination.total_count, 25);
                assert!(first.pagination.has_next);
                assert!(!first.pagination.has_prev);
                assert_eq!(first.items[0].business.name, "Shop 00");

                let last = directory
                    .list_businesses(FilterCriteria::default(), PageRequest::new(3, 10))
                    .await
                    .unwrap();
                assert_eq!(last.items.len(), 5);
                assert_eq!(last.pagination.current_page, 3);
                assert!(!last.pagination.has_next);
                assert!(last.pagination.has_prev);
                assert_eq!(last.items[4].business.name, "Shop 24");
            }

            #[tokio::test]
            async fn test_page_beyond_range() {
                let store = $factory;
                for i in 0..3 {
                    seed_owned_business(&store, "Owner", &format!("Shop {}", i), "Goods", i).await;
                }

                let page = directory_for(&store)
                    .list_businesses(FilterCriteria::default(), PageRequest::new(7, 10))
                    .await
                    .unwrap();
                assert!(page.items.is_empty());
                assert_eq!(page.pagination.total_count, 3);
                assert_eq!(page.pagination.total_pages, 1);
                assert!(!page.pagination.has_next);
                assert!(page.pagination.has_prev);
            }

            #[tokio::test]
            async fn test_huge_page_number() {
                let store = $factory;
                for i in 0..3 {
                    seed_owned_business(&store, "Owner", &format!("Shop {}", i), "Goods", i).await;
                }
                let directory = directory_for(&store);

                let from_query = PageParams {
                    page: Some(i64::MAX.to_string()),
                    limit: Some("10".to_string()),
                }
                .resolve(10, 100);
                for page in [from_query, PageRequest::new(u64::MAX, 100)] {
                    let result = directory
                        .list_businesses(FilterCriteria::default(), page)
                        .await
                        .unwrap();
                    assert!(result.items.is_empty());
                    assert_eq!(result.pagination.total_count, 3);
                    assert!(!result.pagination.has_next);
                    assert!(result.pagination.has_prev);
                }
            }

            #[tokio::test]
            async fn test_listing_store_failure() {
                let store = $factory;
                seed_owned_business(&store, "Owner", "Shop", "Goods", 1).await;

                for operation in ["count_businesses", "list_businesses"] {
                    let directory = FaultyStore::failing(store.clone(), operation).directory();
                    let listing = directory
                        .list_businesses(FilterCriteria::default(), PageRequest::default())
                        .await;
                    assert!(matches!(listing, Err(HubError::Storage(_))), "{operation}");
                    let search = directory
                        .search_businesses(criteria(None, None, Some("shop")), PageRequest::default())
                        .await;
                    assert!(matches!(search, Err(HubError::Storage(_))), "{operation}");
                }
            }

            #[tokio::test]
            async fn test_recency_order() {
                let store = $factory;
                seed_owned_business(&store, "A", "Oldest", "x", 60).await;
                seed_owned_business(&store, "B", "Newest", "x", 1).await;
                seed_owned_business(&store, "C", "Middle", "x", 30).await;

                let page = directory_for(&store)
                    .list_businesses(FilterCriteria::default(), PageRequest::new(1, 10))
                    .await
                    .unwrap();
                assert_eq!(names(&page.items), vec!["Newest", "Middle", "Oldest"]);
            }

            // ==================================================================
            // Search
            // ==================================================================

            #[tokio::test]
            async fn test_ranked_search() {
                let store = $factory;
                seed_owned_business(&store, "A", "Pizza Palace", "Wood-fired", 30).await;
                seed_owned_business(&store, "B", "Campus Bites", "Best pizza in town", 1).await;
                seed_owned_business(&store, "C", "pizza corner", "Slices", 10).await;
                seed_owned_business(&store, "D", "Book Nook", "Novels", 5).await;

                let directory = directory_for(&store);
                let results = directory
                    .search_businesses(criteria(None, None, Some("Pizza")), PageRequest::new(1, 10))
                    .await
                    .unwrap();

                assert_eq!(
                    names(&results.page.items),
                    vec!["pizza corner", "Pizza Palace", "Campus Bites"]
                );
                assert_eq!(results.page.pagination.total_count, 3);
                assert_eq!(results.search_query.as_deref(), Some("Pizza"));

                // Plain listing with the same term stays in recency order
                let listing = directory
                    .list_businesses(criteria(None, None, Some("Pizza")), PageRequest::new(1, 10))
                    .await
                    .unwrap();
                assert_eq!(
                    names(&listing.items),
                    vec!["Campus Bites", "pizza corner", "Pizza Palace"]
                );
            }

            #[tokio::test]
            async fn test_search_without_term_is_recency() {
                let store = $factory;
                seed_owned_business(&store, "A", "First", "x", 20).await;
                seed_owned_business(&store, "B", "Second", "x", 10).await;

                let results = directory_for(&store)
                    .search_businesses(FilterCriteria::default(), PageRequest::new(1, 10))
                    .await
                    .unwrap();
                assert_eq!(names(&results.page.items), vec!["Second", "First"]);
                assert_eq!(results.search_query, None);
            }

            #[tokio::test]
            async fn test_search_escapes_wildcards() {
                let store = $factory;
                seed_owned_business(&store, "A", "100% Juice", "Fresh", 3).await;
                seed_owned_business(&store, "B", "Juicy Fruits", "Fresh", 2).await;
                seed_owned_business(&store, "C", "Snack_Bar", "Chips", 1).await;
                seed_owned_business(&store, "D", "SnackyBar", "Chips", 4).await;

                let directory = directory_for(&store);
                let page = PageRequest::new(1, 10);

                let percent = directory
                    .search_businesses(criteria(None, None, Some("%")), page)
                    .await
                    .unwrap();
                assert_eq!(names(&percent.page.items), vec!["100% Juice"]);

                let underscore = directory
                    .search_businesses(criteria(None, None, Some("k_B")), page)
                    .await
                    .unwrap();
                assert_eq!(names(&underscore.page.items), vec!["Snack_Bar"]);

                let injection = directory
                    .search_businesses(criteria(None, None, Some("' OR 1=1 --")), page)
                    .await
                    .unwrap();
                assert!(injection.page.items.is_empty());
            }

            // ==================================================================
            // Detail & analytics
            // ==================================================================

            #[tokio::test]
            async fn test_detail() {
                let store = $factory;
                let (_, x) = seed_owned_business(&store, "Esi", "Esi Bakes", "Cakes", 1).await;
                let p1 = product(&x, "Cupcake", true);
                store.seed_product(&p1).await.unwrap();
                store
                    .seed_product(&product(&x, "Wedding Cake", false))
                    .await
                    .unwrap();

                let author = user("Nana");
                store.seed_user(&author).await.unwrap();
                store.seed_review(&review(&x, &author, 5, 10)).await.unwrap();
                store.seed_review(&review(&x, &author, 3, 1)).await.unwrap();

                let detail = directory_for(&store).business_detail(x.id).await.unwrap();
                assert_eq!(detail.summary.business.id, x.id);
                assert_eq!(detail.summary.product_count, 2);
                assert_eq!(detail.summary.average_rating, Some(4.0));
                assert_eq!(detail.products.len(), 1);
                assert_eq!(detail.products[0].id, p1.id);
                assert_eq!(detail.reviews.len(), 2);
                assert_eq!(detail.reviews[0].review.rating, 3);
                assert_eq!(detail.reviews[0].first_name, "Nana");
                assert_eq!(detail.reviews[0].username, author.username);
            }

            #[tokio::test]
            async fn test_detail_not_found() {
                let store = $factory;
                let directory = directory_for(&store);

                let missing = directory.business_detail(Uuid::new_v4()).await;
                assert!(matches!(missing, Err(HubError::NotFound { .. })));

                let owner = user("Kofi");
                store.seed_user(&owner).await.unwrap();
                let mut closed = business(&owner, "Closed", "Gone");
                closed.is_active = false;
                store.seed_business(&closed).await.unwrap();

                let inactive = directory.business_detail(closed.id).await;
                assert!(matches!(inactive, Err(HubError::NotFound { .. })));
                let analytics = directory.business_analytics(closed.id).await;
                assert!(matches!(analytics, Err(HubError::NotFound { .. })));
            }

            #[tokio::test]
            async fn test_analytics_report() {
                let store = $factory;
                let (_, x) = seed_owned_business(&store, "Akua", "Akua Mart", "Groceries", 1).await;
                let (_, other) =
                    seed_owned_business(&store, "Fiifi", "Other Mart", "Groceries", 2).await;
                let customer = user("Customer");
                store.seed_user(&customer).await.unwrap();

                let rice = product(&x, "Rice", true);
                let oil = product(&x, "Oil", true);
                let salt = product(&x, "Salt", true);
                let foreign = product(&other, "Foreign", true);
                for p in [&rice, &oil, &salt, &foreign] {
                    store.seed_product(p).await.unwrap();
                }

                let now = at(Duration::zero());
                let o1 = order(&x, &customer, 10.0, "pending", now);
                let o2 = order(&x, &customer, 20.0, "completed", now - Duration::days(2));
                let o3 = order(&x, &customer, 30.0, "completed", now - Duration::days(40));
                let o4 = order(&other, &customer, 99.0, "completed", now);
                for o in [&o1, &o2, &o3, &o4] {
                    store.seed_order(o).await.unwrap();
                }
                for item in [
                    order_item(&o1, &rice, 3),
                    order_item(&o2, &rice, 2),
                    order_item(&o2, &oil, 7),
                    order_item(&o3, &salt, 1),
                    order_item(&o4, &foreign, 50),
                ] {
                    store.seed_order_item(&item).await.unwrap();
                }

                let report = directory_for(&store).business_analytics(x.id).await.unwrap();

                assert_eq!(report.totals.total_orders, 3);
                assert!((report.totals.total_revenue - 60.0).abs() < 1e-9);
                assert!((report.totals.avg_order_value - 20.0).abs() < 1e-9);

                let statuses: Vec<(String, i64)> = report
                    .orders_by_status
                    .iter()
                    .map(|s| (s.status.clone(), s.count))
                    .collect();
                assert_eq!(
                    statuses,
                    vec![("completed".to_string(), 2), ("pending".to_string(), 1)]
                );

                let top: Vec<(Uuid, i64)> =
                    report.top_products.iter().map(|p| (p.id, p.total_sold)).collect();
                assert_eq!(top, vec![(oil.id, 7), (rice.id, 5), (salt.id, 1)]);

                // The 40-day-old order falls outside the window; empty days are omitted
                let days: Vec<_> = report
                    .orders_per_day
                    .iter()
                    .map(|d| (d.day, d.orders))
                    .collect();
                assert_eq!(
                    days,
                    vec![
                        ((now - Duration::days(2)).date_naive(), 1),
                        (now.date_naive(), 1)
                    ]
                );
            }

            #[tokio::test]
            async fn test_analytics_empty() {
                let store = $factory;
                let (_, x) = seed_owned_business(&store, "New", "New Shop", "Fresh start", 1).await;

                let report = directory_for(&store).business_analytics(x.id).await.unwrap();
                assert_eq!(report.totals.total_orders, 0);
                assert_eq!(report.totals.total_revenue, 0.0);
                assert_eq!(report.totals.avg_order_value, 0.0);
                assert!(report.orders_by_status.is_empty());
                assert!(report.top_products.is_empty());
                assert!(report.orders_per_day.is_empty());
            }

            #[tokio::test]
            async fn test_top_products_cap_and_ties() {
                let store = $factory;
                let (_, x) = seed_owned_business(&store, "Kwame", "Kwame Stores", "Everything", 1).await;
                let customer = user("Buyer");
                store.seed_user(&customer).await.unwrap();
                let o = order(&x, &customer, 50.0, "completed", at(Duration::zero()));
                store.seed_order(&o).await.unwrap();

                let mut sold = Vec::new();
                for (name, quantity) in [
                    ("Apples", 4),
                    ("Bread", 4),
                    ("Cocoa", 9),
                    ("Dates", 1),
                    ("Eggs", 4),
                    ("Flour", 2),
                    ("Garri", 1),
                ] {
                    let p = product(&x, name, true);
                    store.seed_product(&p).await.unwrap();
                    store.seed_order_item(&order_item(&o, &p, quantity)).await.unwrap();
                    sold.push((p.id, quantity as i64));
                }

                let report = directory_for(&store).business_analytics(x.id).await.unwrap();
                let top: Vec<(Uuid, i64)> =
                    report.top_products.iter().map(|p| (p.id, p.total_sold)).collect();

                let mut tied: Vec<(Uuid, i64)> =
                    sold.iter().copied().filter(|(_, q)| *q == 4).collect();
                tied.sort();
                let mut expected = vec![sold[2]];
                expected.extend(tied);
                expected.push(sold[5]);
                assert_eq!(top, expected);
            }

            #[tokio::test]
            async fn test_analytics_fails_as_a_whole() {
                let store = $factory;
                let (_, x) = seed_owned_business(&store, "Yaa", "Yaa Prints", "Prints", 1).await;
                let customer = user("Buyer");
                store.seed_user(&customer).await.unwrap();
                store
                    .seed_order(&order(&x, &customer, 15.0, "completed", at(Duration::zero())))
                    .await
                    .unwrap();

                for operation in ["order_totals", "orders_by_status", "top_products", "orders_per_day"] {
                    let report = FaultyStore::failing(store.clone(), operation)
                        .directory()
                        .business_analytics(x.id)
                        .await;
                    assert!(matches!(report, Err(HubError::Storage(_))), "{operation}");
                }
            }

            // ==================================================================
            // Writes
            // ==================================================================

            fn registration(name: &str) -> NewBusiness {
                NewBusiness {
                    name: name.to_string(),
                    description: "Hand-made beads".to_string(),
                    category: "Fashion".to_string(),
                    location: "Brunei".to_string(),
                    contact_number: "0501234567".to_string(),
                    ..NewBusiness::default()
                }
            }

            #[tokio::test]
            async fn test_create_business_rules() {
                let store = $factory;
                let directory = directory_for(&store);

                let stranger = directory
                    .create_business(Uuid::new_v4(), registration("Ghost Beads"))
                    .await;
                assert!(matches!(stranger, Err(HubError::BadRequest(_))));

                let owner = user("Serwaa");
                store.seed_user(&owner).await.unwrap();

                let invalid = directory
                    .create_business(owner.id, NewBusiness::default())
                    .await;
                assert!(matches!(invalid, Err(HubError::Validation(_))));

                let created = directory
                    .create_business(owner.id, registration("Serwaa Beads"))
                    .await
                    .unwrap();
                assert!(created.is_active);
                assert_eq!(created.owner_id, owner.id);

                let second = directory
                    .create_business(owner.id, registration("Serwaa Beads 2"))
                    .await;
                assert!(matches!(second, Err(HubError::Conflict(_))));

                // A deactivated business frees the slot
                directory.delete_business(owner.id, created.id).await.unwrap();
                directory
                    .create_business(owner.id, registration("Serwaa Beads 2"))
                    .await
                    .unwrap();
            }

            #[tokio::test]
            async fn test_update_and_delete_ownership() {
                let store = $factory;
                let (owner, x) =
                    seed_owned_business(&store, "Mawuli", "Mawuli Tees", "Shirts", 1).await;
                let intruder = user("Intruder");
                store.seed_user(&intruder).await.unwrap();
                let directory = directory_for(&store);

                let patch = BusinessPatch {
                    name: Some("Mawuli Threads".to_string()),
                    ..BusinessPatch::default()
                };

                let forbidden = directory.update_business(intruder.id, x.id, patch.clone()).await;
                assert!(matches!(forbidden, Err(HubError::Forbidden { .. })));

                let updated = directory.update_business(owner.id, x.id, patch).await.unwrap();
                assert_eq!(updated.name, "Mawuli Threads");
                assert_eq!(updated.description, "Shirts");

                let forbidden = directory.delete_business(intruder.id, x.id).await;
                assert!(matches!(forbidden, Err(HubError::Forbidden { .. })));

                directory.delete_business(owner.id, x.id).await.unwrap();
                assert!(matches!(
                    directory.business_detail(x.id).await,
                    Err(HubError::NotFound { .. })
                ));
                assert!(matches!(
                    directory.delete_business(owner.id, x.id).await,
                    Err(HubError::NotFound { .. })
                ));
            }

            #[tokio::test]
            async fn test_racing_registration_is_conflict() {
                let store = $factory;
                let owner = user("Adjoa");
                store.seed_user(&owner).await.unwrap();
                directory_for(&store)
                    .create_business(owner.id, registration("Adjoa Cakes"))
                    .await
                    .unwrap();

                // The pre-check misses the first business, as it would when two
                // registrations run side by side
                let stale = FaultyStore::with_stale_owner_check(store.clone()).directory();
                let late = stale
                    .create_business(owner.id, registration("Adjoa Cakes 2"))
                    .await;
                assert!(matches!(late, Err(HubError::Conflict(_))));

                let other = user("Kojo");
                store.seed_user(&other).await.unwrap();
                let (a, b) = tokio::join!(
                    stale.create_business(other.id, registration("Kojo Wings")),
                    stale.create_business(other.id, registration("Kojo Wings 2")),
                );
                let outcomes = [a, b];
                assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
                assert_eq!(
                    outcomes
                        .iter()
                        .filter(|r| matches!(r, Err(HubError::Conflict(_))))
                        .count(),
                    1
                );
            }
        }
    };
}
