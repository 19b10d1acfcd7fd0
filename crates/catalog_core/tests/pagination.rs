use catalog_core::db::open_db_in_memory;
use catalog_core::model::validation::ValidationError;
use catalog_core::{
    CategoryId, CategoryRepository, ItemListQuery, ItemRepository, ItemService, NewCategory,
    NewItem, PageRequest, Price, RepoError, SqliteCategoryRepository, SqliteItemRepository,
};
use rusqlite::Connection;

struct Fixture {
    kitchen: CategoryId,
    garage: CategoryId,
}

/// 25 items: the first 15 in `kitchen`, the rest in `garage`.
fn populate(conn: &Connection) -> Fixture {
    let categories = SqliteCategoryRepository::try_new(conn).unwrap();
    let items = SqliteItemRepository::try_new(conn).unwrap();

    let saved = categories
        .save_batch(&[
            NewCategory::new("kitchen_0", "Kitchen"),
            NewCategory::new("garage_1", "Garage"),
        ])
        .unwrap();
    let kitchen = saved[0].id;
    let garage = saved[1].id;

    let drafts = (0..25)
        .map(|index| NewItem {
            sku: format!("SKU-{index:03}"),
            name: format!("Item {index}"),
            description: None,
            price: Price::from_cents(100 + index).unwrap(),
            stock: 1,
            category_id: Some(if index < 15 { kitchen } else { garage }),
        })
        .collect::<Vec<_>>();
    items.save_batch(&drafts).unwrap();

    Fixture { kitchen, garage }
}

#[test]
fn total_pages_and_last_page_length_follow_ceiling_division() {
    let conn = open_db_in_memory().unwrap();
    populate(&conn);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let first = repo.find_all(PageRequest::new(0, 10).unwrap()).unwrap();
    assert_eq!(first.total_elements, 25);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.content.len(), 10);
    assert_eq!(first.content[0].sku, "SKU-000");

    let last = repo.find_all(PageRequest::new(2, 10).unwrap()).unwrap();
    assert_eq!(last.content.len(), 5);
    assert_eq!(last.number, 2);
    assert_eq!(last.content[4].sku, "SKU-024");

    let beyond = repo.find_all(PageRequest::new(3, 10).unwrap()).unwrap();
    assert!(beyond.content.is_empty());
    assert_eq!(beyond.total_elements, 25);
}

#[test]
fn find_all_pages_in_insertion_order_without_overlap() {
    let conn = open_db_in_memory().unwrap();
    populate(&conn);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let mut seen = Vec::new();
    for page in 0..4 {
        let result = repo.find_all(PageRequest::new(page, 7).unwrap()).unwrap();
        seen.extend(result.content.into_iter().map(|item| item.id));
    }

    assert_eq!(seen.len(), 25);
    assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn category_listing_resolves_every_category_with_the_join() {
    let conn = open_db_in_memory().unwrap();
    let fixture = populate(&conn);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let page = repo
        .find_items_by_category(fixture.garage, PageRequest::new(0, 4).unwrap())
        .unwrap();
    assert_eq!(page.total_elements, 10);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.content.len(), 4);
    for entry in &page.content {
        assert_eq!(entry.item.category_id, Some(fixture.garage));
        assert_eq!(entry.category.id, fixture.garage);
        assert_eq!(entry.category.code, "garage_1");
        assert_eq!(entry.category.name, "Garage");
    }

    let last = repo
        .find_items_by_category(fixture.garage, PageRequest::new(2, 4).unwrap())
        .unwrap();
    assert_eq!(last.content.len(), 2);
    assert_eq!(repo.count_by_category(fixture.kitchen).unwrap(), 15);
}

#[test]
fn category_listing_for_unknown_category_is_empty() {
    let conn = open_db_in_memory().unwrap();
    populate(&conn);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let page = repo
        .find_items_by_category(CategoryId(404), PageRequest::default())
        .unwrap();
    assert!(page.content.is_empty());
    assert_eq!(page.total_elements, 0);
    assert_eq!(page.total_pages, 0);
}

#[test]
fn category_listing_skips_uncategorized_items() {
    let conn = open_db_in_memory().unwrap();
    let fixture = populate(&conn);
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    repo.save(&NewItem {
        sku: "SKU-LOOSE".to_string(),
        name: "Loose".to_string(),
        description: None,
        price: Price::from_cents(1).unwrap(),
        stock: 0,
        category_id: None,
    })
    .unwrap();

    let kitchen = repo
        .find_items_by_category(fixture.kitchen, PageRequest::new(0, 100).unwrap())
        .unwrap();
    assert_eq!(kitchen.total_elements, 15);
    assert_eq!(repo.find_all(PageRequest::default()).unwrap().total_elements, 26);
}

#[test]
fn service_switches_on_category_filter() {
    let conn = open_db_in_memory().unwrap();
    let fixture = populate(&conn);
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());

    let unfiltered = service
        .list_items(&ItemListQuery {
            page: 1,
            size: 10,
            category_id: None,
        })
        .unwrap();
    assert_eq!(unfiltered.total_elements, 25);
    assert!(unfiltered.content.iter().all(|view| view.category.is_none()));

    let filtered = service
        .list_items(&ItemListQuery {
            page: 0,
            size: 20,
            category_id: Some(fixture.kitchen),
        })
        .unwrap();
    assert_eq!(filtered.total_elements, 15);
    assert_eq!(filtered.total_pages, 1);
    assert!(filtered.content.iter().all(|view| {
        view.category.as_ref().map(|category| category.id) == Some(fixture.kitchen)
    }));
}

#[test]
fn service_rejects_zero_page_size() {
    let conn = open_db_in_memory().unwrap();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());

    let err = service
        .list_items(&ItemListQuery {
            page: 0,
            size: 0,
            category_id: None,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidPageSize(0))
    ));
}

#[test]
fn listing_envelope_serializes_with_external_field_names() {
    let conn = open_db_in_memory().unwrap();
    let fixture = populate(&conn);
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());

    let query: ItemListQuery = serde_json::from_value(serde_json::json!({
        "page": 0,
        "size": 2,
        "categoryId": fixture.garage.0
    }))
    .unwrap();
    let page = service.list_items(&query).unwrap();
    let value = serde_json::to_value(&page).unwrap();

    assert_eq!(value["totalElements"], 10);
    assert_eq!(value["totalPages"], 5);
    assert_eq!(value["number"], 0);
    assert_eq!(value["size"], 2);
    let first = &value["content"][0];
    assert_eq!(first["sku"], "SKU-015");
    assert_eq!(first["categoryId"], fixture.garage.0);
    assert_eq!(first["category"]["code"], "garage_1");
    assert_eq!(first["price"], "1.15");
}

#[test]
fn list_query_defaults_to_first_page_of_ten() {
    let query: ItemListQuery = serde_json::from_value(serde_json::json!({})).unwrap();
    assert_eq!(query, ItemListQuery::default());
    assert_eq!(query.size, 10);
    assert_eq!(query.category_id, None);
}
