use diesel::prelude::*;
use rust_decimal::Decimal;

use pushkind_catalog::domain::category::{Category, CategoryListQuery, NewCategory, UpdateCategory};
use pushkind_catalog::domain::product::{NewProduct, Product, ProductListQuery, ProductSort, UpdateProduct};
use pushkind_catalog::domain::product_detail::Measurements;
use pushkind_catalog::domain::tag::{NewTag, Tag, TagListQuery};
use pushkind_catalog::repository::{
    CategoryReader, CategoryWriter, DieselRepository, ProductDetailReader, ProductDetailWriter,
    ProductReader, ProductWriter, RepositoryError, TagReader, TagWriter,
};
use pushkind_catalog::schema::product_details;

mod common;

fn add_category(repo: &DieselRepository, name: &str) -> Category {
    repo.create_category(&NewCategory::new(name))
        .expect("create category")
}

fn add_tag(repo: &DieselRepository, name: &str) -> Tag {
    repo.create_tag(&NewTag::new(name)).expect("create tag")
}

fn add_product(repo: &DieselRepository, product: NewProduct) -> Product {
    repo.create_product(&product).expect("create product")
}

fn detail_rows(test_db: &common::TestDb, product_id: i32) -> i64 {
    let mut conn = test_db.pool().get().expect("connection");
    product_details::table
        .filter(product_details::product_id.eq(product_id))
        .count()
        .get_result(&mut conn)
        .expect("count details")
}

#[test]
fn test_category_names_are_unique_and_case_sensitive() {
    let test_db = common::TestDb::new("test_category_names_are_unique.db");
    let repo = DieselRepository::new(test_db.pool());

    add_category(&repo, "Electronics");

    let err = repo
        .create_category(&NewCategory::new("Electronics"))
        .expect_err("duplicate name must be rejected");
    match err {
        RepositoryError::UniqueViolation { column } => assert_eq!(column, "name"),
        other => panic!("unexpected error: {other:?}"),
    }

    let lower = add_category(&repo, "electronics");
    assert_eq!(lower.name, "electronics");

    let all = repo
        .list_categories(CategoryListQuery::new())
        .expect("list categories");
    assert_eq!(all.len(), 2);
}

#[test]
fn test_category_list_is_sorted_and_searchable() {
    let test_db = common::TestDb::new("test_category_list_is_sorted.db");
    let repo = DieselRepository::new(test_db.pool());

    add_category(&repo, "Garden");
    add_category(&repo, "Electronics");
    add_category(&repo, "Books");

    let names: Vec<String> = repo
        .list_categories(CategoryListQuery::new())
        .expect("list categories")
        .into_iter()
        .map(|category| category.name)
        .collect();
    assert_eq!(names, vec!["Books", "Electronics", "Garden"]);

    let found = repo
        .list_categories(CategoryListQuery::new().search("GAR"))
        .expect("search categories");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Garden");
}

#[test]
fn test_category_update_checks_uniqueness_and_existence() {
    let test_db = common::TestDb::new("test_category_update.db");
    let repo = DieselRepository::new(test_db.pool());

    let books = add_category(&repo, "Books");
    add_category(&repo, "Garden");

    let renamed = repo
        .update_category(books.id, &UpdateCategory::new("Novels"))
        .expect("rename category");
    assert_eq!(renamed.name, "Novels");

    let same = repo
        .update_category(books.id, &UpdateCategory::new("Novels"))
        .expect("renaming to the current name is allowed");
    assert_eq!(same.id, books.id);

    let err = repo
        .update_category(books.id, &UpdateCategory::new("Garden"))
        .expect_err("name taken");
    assert!(matches!(err, RepositoryError::UniqueViolation { .. }));

    let err = repo
        .update_category(books.id + 100, &UpdateCategory::new("Ghost"))
        .expect_err("unknown category");
    assert!(matches!(err, RepositoryError::NotFound));
}

#[test]
fn test_category_delete_is_blocked_while_referenced() {
    let test_db = common::TestDb::new("test_category_delete_blocked.db");
    let repo = DieselRepository::new(test_db.pool());

    let electronics = add_category(&repo, "Electronics");
    let empty = add_category(&repo, "Empty");
    let cable = add_product(
        &repo,
        NewProduct::new("Cable", "", Decimal::new(999, 2), electronics.id),
    );

    let err = repo
        .delete_category(electronics.id)
        .expect_err("category in use");
    assert!(matches!(err, RepositoryError::InUse { references: 1 }));
    assert!(
        repo.get_category_by_id(electronics.id)
            .expect("get category")
            .is_some()
    );

    repo.delete_category(empty.id).expect("unused category");

    repo.delete_product(cable.id).expect("delete product");
    repo.delete_category(electronics.id)
        .expect("category no longer in use");

    let err = repo
        .delete_category(electronics.id)
        .expect_err("already deleted");
    assert!(matches!(err, RepositoryError::NotFound));
}

#[test]
fn test_tag_delete_detaches_from_products() {
    let test_db = common::TestDb::new("test_tag_delete_detaches.db");
    let repo = DieselRepository::new(test_db.pool());

    let category = add_category(&repo, "Electronics");
    let sale = add_tag(&repo, "sale");
    let usb = add_tag(&repo, "usb");
    let cable = add_product(
        &repo,
        NewProduct::new("Cable", "", Decimal::new(999, 2), category.id)
            .with_tag_ids(vec![usb.id, sale.id, sale.id]),
    );

    let tag_names: Vec<&str> = cable.tags.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(tag_names, vec!["sale", "usb"]);

    repo.delete_tag(sale.id).expect("delete tag");

    let reloaded = repo
        .get_product_by_id(cable.id)
        .expect("get product")
        .expect("product still exists");
    assert_eq!(reloaded.tags.len(), 1);
    assert_eq!(reloaded.tags[0].id, usb.id);

    let remaining = repo.list_tags(TagListQuery::new()).expect("list tags");
    assert_eq!(remaining.len(), 1);

    let err = repo.delete_tag(sale.id).expect_err("already deleted");
    assert!(matches!(err, RepositoryError::NotFound));
}

#[test]
fn test_get_tags_by_ids_skips_unknown_ids() {
    let test_db = common::TestDb::new("test_get_tags_by_ids.db");
    let repo = DieselRepository::new(test_db.pool());

    let sale = add_tag(&repo, "sale");

    let found = repo
        .get_tags_by_ids(&[sale.id, sale.id + 10])
        .expect("get tags");

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "sale");
}

#[test]
fn test_product_delete_removes_detail_and_keeps_category() {
    let test_db = common::TestDb::new("test_product_delete_cascades.db");
    let repo = DieselRepository::new(test_db.pool());

    let category = add_category(&repo, "Electronics");
    let tag = add_tag(&repo, "usb");
    let cable = add_product(
        &repo,
        NewProduct::new("Cable", "Braided", Decimal::new(999, 2), category.id)
            .with_tag_ids(vec![tag.id])
            .with_measurements(Measurements::new().weight_kg(Decimal::new(15, 1))),
    );
    assert!(cable.detail.is_some());

    repo.delete_product(cable.id).expect("delete product");

    assert!(repo.get_product_by_id(cable.id).expect("get").is_none());
    assert!(
        repo.get_product_detail(cable.id)
            .expect("get detail")
            .is_none()
    );
    assert_eq!(detail_rows(&test_db, cable.id), 0);
    assert!(
        repo.get_category_by_id(category.id)
            .expect("get category")
            .is_some()
    );
    assert_eq!(repo.list_tags(TagListQuery::new()).expect("tags").len(), 1);

    let err = repo.delete_product(cable.id).expect_err("already deleted");
    assert!(matches!(err, RepositoryError::NotFound));
}

#[test]
fn test_cable_is_listed_first_with_exact_price() {
    let test_db = common::TestDb::new("test_cable_scenario.db");
    let repo = DieselRepository::new(test_db.pool());

    let electronics = add_category(&repo, "Electronics");
    add_product(
        &repo,
        NewProduct::new("Lamp", "Desk lamp", Decimal::new(2500, 2), electronics.id),
    );
    let cable = add_product(
        &repo,
        NewProduct::new("Cable", "", Decimal::new(999, 2), electronics.id).with_stock(10),
    );

    let (total, items) = repo
        .list_products(ProductListQuery::new())
        .expect("list products");
    assert_eq!(total, 2);
    assert_eq!(items[0].name, "Cable");

    let stored = repo
        .get_product_by_id(cable.id)
        .expect("get product")
        .expect("product exists");
    assert_eq!(stored.price, Decimal::new(999, 2));
    assert_eq!(stored.price.to_string(), "9.99");
    assert_eq!(stored.stock, 10);
    assert_eq!(stored.category_id, electronics.id);
}

#[test]
fn test_product_defaults_and_name_uniqueness() {
    let test_db = common::TestDb::new("test_product_defaults.db");
    let repo = DieselRepository::new(test_db.pool());

    let category = add_category(&repo, "Electronics");
    let cable = add_product(
        &repo,
        NewProduct::new("Cable", "", Decimal::ZERO, category.id),
    );
    assert_eq!(cable.stock, 0);
    assert!(cable.tags.is_empty());
    assert!(cable.detail.is_none());
    assert_eq!(detail_rows(&test_db, cable.id), 0);

    let err = repo
        .create_product(&NewProduct::new("Cable", "", Decimal::ONE, category.id))
        .expect_err("duplicate product name");
    match err {
        RepositoryError::UniqueViolation { column } => assert_eq!(column, "name"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_product_requires_existing_category() {
    let test_db = common::TestDb::new("test_product_requires_category.db");
    let repo = DieselRepository::new(test_db.pool());

    let err = repo
        .create_product(&NewProduct::new("Orphan", "", Decimal::ONE, 42))
        .expect_err("missing category");

    assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    let (total, _) = repo
        .list_products(ProductListQuery::new())
        .expect("list products");
    assert_eq!(total, 0);
}

#[test]
fn test_product_create_rolls_back_on_unknown_tag() {
    let test_db = common::TestDb::new("test_product_create_rolls_back.db");
    let repo = DieselRepository::new(test_db.pool());

    let category = add_category(&repo, "Electronics");

    let err = repo
        .create_product(
            &NewProduct::new("Cable", "", Decimal::ONE, category.id).with_tag_ids(vec![77]),
        )
        .expect_err("unknown tag");

    assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    let (total, _) = repo
        .list_products(ProductListQuery::new())
        .expect("list products");
    assert_eq!(total, 0);
}

#[test]
fn test_product_search_and_category_filter_compose() {
    let test_db = common::TestDb::new("test_product_search.db");
    let repo = DieselRepository::new(test_db.pool());

    let cables = add_category(&repo, "Cables");
    let lighting = add_category(&repo, "Lighting");
    add_product(
        &repo,
        NewProduct::new("Cable", "Braided USB-C", Decimal::new(999, 2), cables.id),
    );
    add_product(
        &repo,
        NewProduct::new("Lamp", "usb powered", Decimal::new(2500, 2), lighting.id),
    );
    add_product(
        &repo,
        NewProduct::new("Adapter", "100% copper", Decimal::new(500, 2), cables.id),
    );

    let (total, items) = repo
        .list_products(ProductListQuery::new().search("USB"))
        .expect("search");
    assert_eq!(total, 2);
    let names: Vec<&str> = items.iter().map(|product| product.name.as_str()).collect();
    assert_eq!(names, vec!["Lamp", "Cable"]);

    let (total, items) = repo
        .list_products(ProductListQuery::new().search("usb").category(cables.id))
        .expect("search within category");
    assert_eq!(total, 1);
    assert_eq!(items[0].name, "Cable");

    let (total, items) = repo
        .list_products(ProductListQuery::new().search("0%"))
        .expect("literal percent");
    assert_eq!(total, 1);
    assert_eq!(items[0].name, "Adapter");

    let (total, _) = repo
        .list_products(ProductListQuery::new().search("_"))
        .expect("literal underscore");
    assert_eq!(total, 0);

    let (total, _) = repo
        .list_products(ProductListQuery::new().search("   "))
        .expect("blank search");
    assert_eq!(total, 3);
}

#[test]
fn test_product_sort_and_pagination() {
    let test_db = common::TestDb::new("test_product_sort.db");
    let repo = DieselRepository::new(test_db.pool());

    let category = add_category(&repo, "Misc");
    for name in ["Bravo", "Alpha", "Charlie"] {
        add_product(&repo, NewProduct::new(name, "", Decimal::ONE, category.id));
    }

    let (total, first_page) = repo
        .list_products(ProductListQuery::new().paginate(1, 2))
        .expect("first page");
    assert_eq!(total, 3);
    let names: Vec<&str> = first_page.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Charlie", "Alpha"]);

    let (_, second_page) = repo
        .list_products(ProductListQuery::new().paginate(2, 2))
        .expect("second page");
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].name, "Bravo");

    let (_, by_name) = repo
        .list_products(ProductListQuery::new().sort(ProductSort::Name))
        .expect("sorted by name");
    let names: Vec<&str> = by_name.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Bravo", "Charlie"]);
}

#[test]
fn test_product_page_far_past_the_end_is_empty() {
    let test_db = common::TestDb::new("test_product_far_page.db");
    let repo = DieselRepository::new(test_db.pool());

    let category = add_category(&repo, "Misc");
    add_product(&repo, NewProduct::new("Alpha", "", Decimal::ONE, category.id));

    let (total, items) = repo
        .list_products(ProductListQuery::new().paginate(usize::MAX, 20))
        .expect("huge page");
    assert_eq!(total, 1);
    assert!(items.is_empty());

    let (_, items) = repo
        .list_products(ProductListQuery::new().paginate(usize::MAX / 20, 20))
        .expect("page with offset beyond i64");
    assert!(items.is_empty());
}

#[test]
fn test_product_update_replaces_relations() {
    let test_db = common::TestDb::new("test_product_update.db");
    let repo = DieselRepository::new(test_db.pool());

    let cables = add_category(&repo, "Cables");
    let lighting = add_category(&repo, "Lighting");
    let sale = add_tag(&repo, "sale");
    let usb = add_tag(&repo, "usb");
    let cable = add_product(
        &repo,
        NewProduct::new("Cable", "", Decimal::new(999, 2), cables.id)
            .with_tag_ids(vec![sale.id])
            .with_measurements(Measurements::new().weight_kg(Decimal::new(150, 2))),
    );

    let updates = UpdateProduct::from(
        NewProduct::new("Cable v2", "Longer", Decimal::new(1250, 2), lighting.id)
            .with_stock(3)
            .with_tag_ids(vec![usb.id]),
    );
    let updated = repo
        .update_product(cable.id, &updates)
        .expect("update product");

    assert_eq!(updated.name, "Cable v2");
    assert_eq!(updated.price, Decimal::new(1250, 2));
    assert_eq!(updated.stock, 3);
    assert_eq!(updated.category_id, lighting.id);
    assert_eq!(updated.tags.len(), 1);
    assert_eq!(updated.tags[0].id, usb.id);

    // The existing detail row is kept and every measurement cleared.
    let detail = updated.detail.expect("detail row is kept");
    assert_eq!(detail.measurements(), Measurements::new());
    assert_eq!(detail_rows(&test_db, cable.id), 1);

    let err = repo
        .update_product(cable.id + 100, &updates)
        .expect_err("unknown product");
    assert!(matches!(err, RepositoryError::NotFound));
}

#[test]
fn test_detail_sync_overwrites_every_field() {
    let test_db = common::TestDb::new("test_detail_sync_overwrites.db");
    let repo = DieselRepository::new(test_db.pool());

    let category = add_category(&repo, "Electronics");
    let cable = add_product(
        &repo,
        NewProduct::new("Cable", "", Decimal::new(999, 2), category.id),
    );

    let first = repo
        .sync_product_detail(cable.id, &Measurements::new().weight_kg(Decimal::new(15, 1)))
        .expect("first sync")
        .expect("detail created");
    assert_eq!(first.weight_kg, Some(Decimal::new(150, 2)));
    assert_eq!(first.height_cm, None);
    assert_eq!(first.width_cm, None);
    assert_eq!(first.length_cm, None);

    let second = repo
        .sync_product_detail(cable.id, &Measurements::new().height_cm(Decimal::new(20, 1)))
        .expect("second sync")
        .expect("detail updated");
    assert_eq!(second.id, first.id);
    assert_eq!(second.weight_kg, None);
    assert_eq!(second.height_cm, Some(Decimal::new(200, 2)));
    assert_eq!(second.width_cm, None);
    assert_eq!(second.length_cm, None);
    assert_eq!(detail_rows(&test_db, cable.id), 1);
}

#[test]
fn test_detail_sync_is_idempotent() {
    let test_db = common::TestDb::new("test_detail_sync_idempotent.db");
    let repo = DieselRepository::new(test_db.pool());

    let category = add_category(&repo, "Electronics");
    let cable = add_product(
        &repo,
        NewProduct::new("Cable", "", Decimal::new(999, 2), category.id),
    );
    let measurements = Measurements::new()
        .weight_kg(Decimal::new(150, 2))
        .length_cm(Decimal::new(10000, 2));

    let first = repo
        .sync_product_detail(cable.id, &measurements)
        .expect("first sync");
    let second = repo
        .sync_product_detail(cable.id, &measurements)
        .expect("second sync");

    assert_eq!(
        first.map(|detail| detail.measurements()),
        second.map(|detail| detail.measurements())
    );
    assert_eq!(detail_rows(&test_db, cable.id), 1);

    let stored = repo
        .get_product_detail(cable.id)
        .expect("get detail")
        .expect("detail exists");
    assert_eq!(stored.measurements(), measurements);
}

#[test]
fn test_detail_sync_without_values_creates_nothing() {
    let test_db = common::TestDb::new("test_detail_sync_empty.db");
    let repo = DieselRepository::new(test_db.pool());

    let category = add_category(&repo, "Electronics");
    let cable = add_product(
        &repo,
        NewProduct::new("Cable", "", Decimal::new(999, 2), category.id),
    );

    let result = repo
        .sync_product_detail(cable.id, &Measurements::new())
        .expect("sync");

    assert!(result.is_none());
    assert_eq!(detail_rows(&test_db, cable.id), 0);

    let err = repo
        .sync_product_detail(cable.id + 100, &Measurements::new())
        .expect_err("unknown product");
    assert!(matches!(err, RepositoryError::NotFound));
}
