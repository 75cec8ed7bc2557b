use std::collections::{BTreeSet, HashMap};

use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use crate::domain::product::{
    NewProduct as DomainNewProduct, Product as DomainProduct, ProductListQuery, ProductSort,
    UpdateProduct as DomainUpdateProduct,
};
use crate::domain::product_detail::ProductDetail as DomainProductDetail;
use crate::domain::tag::Tag as DomainTag;
use crate::models::product::{
    NewProduct as DbNewProduct, Product as DbProduct, UpdateProduct as DbUpdateProduct,
};
use crate::models::product_detail::ProductDetail as DbProductDetail;
use crate::models::product_tag::NewProductTag;
use crate::models::tag::Tag as DbTag;
use crate::repository::product_detail::sync_detail;
use crate::repository::{
    DieselRepository, ProductReader, ProductWriter, RepositoryError, RepositoryResult,
    like_pattern,
};
use crate::schema::products;

impl ProductReader for DieselRepository {
    fn get_product_by_id(&self, product_id: i32) -> RepositoryResult<Option<DomainProduct>> {
        let mut conn = self.conn()?;

        let product = products::table
            .filter(products::id.eq(product_id))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        match product {
            Some(db_product) => Ok(hydrate_products(&mut conn, vec![db_product])?.pop()),
            None => Ok(None),
        }
    }

    fn list_products(
        &self,
        query: ProductListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainProduct>)> {
        let mut conn = self.conn()?;

        let total = filtered_products(&query)
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let mut items = filtered_products(&query);

        items = match query.sort {
            ProductSort::Newest => items.order(products::id.desc()),
            ProductSort::Name => items.order((products::name.asc(), products::id.desc())),
        };

        if let Some(pagination) = &query.pagination {
            let offset = (pagination.page.max(1) - 1)
                .checked_mul(pagination.per_page)
                .and_then(|offset| i64::try_from(offset).ok());
            let limit = i64::try_from(pagination.per_page).unwrap_or(i64::MAX);
            match offset {
                Some(offset) => items = items.offset(offset).limit(limit),
                // Past any page SQLite could hold.
                None => return Ok((total, Vec::new())),
            }
        }

        let db_products = items.load::<DbProduct>(&mut conn)?;

        if db_products.is_empty() {
            return Ok((total, Vec::new()));
        }

        Ok((total, hydrate_products(&mut conn, db_products)?))
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, new_product: &DomainNewProduct) -> RepositoryResult<DomainProduct> {
        let mut conn = self.conn()?;

        conn.transaction::<DomainProduct, RepositoryError, _>(|conn| {
            let created = diesel::insert_into(products::table)
                .values(&DbNewProduct::from(new_product))
                .get_result::<DbProduct>(conn)?;

            replace_product_tags(conn, created.id, &new_product.tag_ids)?;
            sync_detail(conn, created.id, &new_product.measurements)?;

            single_product(conn, created)
        })
    }

    fn update_product(
        &self,
        product_id: i32,
        updates: &DomainUpdateProduct,
    ) -> RepositoryResult<DomainProduct> {
        let mut conn = self.conn()?;

        conn.transaction::<DomainProduct, RepositoryError, _>(|conn| {
            let updated = diesel::update(products::table.filter(products::id.eq(product_id)))
                .set(&DbUpdateProduct::from(updates))
                .get_result::<DbProduct>(conn)?;

            replace_product_tags(conn, updated.id, &updates.tag_ids)?;
            sync_detail(conn, updated.id, &updates.measurements)?;

            single_product(conn, updated)
        })
    }

    fn delete_product(&self, product_id: i32) -> RepositoryResult<()> {
        use crate::schema::{product_details, product_tags};

        let mut conn = self.conn()?;

        conn.transaction::<(), RepositoryError, _>(|conn| {
            diesel::delete(
                product_details::table.filter(product_details::product_id.eq(product_id)),
            )
            .execute(conn)?;

            diesel::delete(product_tags::table.filter(product_tags::product_id.eq(product_id)))
                .execute(conn)?;

            let deleted =
                diesel::delete(products::table.filter(products::id.eq(product_id))).execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }

            Ok(())
        })
    }
}

/// Products matching the search and category filters, without ordering.
fn filtered_products(query: &ProductListQuery) -> products::BoxedQuery<'static, Sqlite> {
    let mut items = products::table.into_boxed::<Sqlite>();

    if let Some(term) = query.search.as_deref().map(str::trim)
        && !term.is_empty()
    {
        let pattern = like_pattern(term);
        items = items.filter(
            products::name
                .like(pattern.clone())
                .escape('\\')
                .or(products::description.like(pattern).escape('\\')),
        );
    }

    if let Some(category_id) = query.category_id {
        items = items.filter(products::category_id.eq(category_id));
    }

    items
}

fn replace_product_tags(
    conn: &mut SqliteConnection,
    product_id: i32,
    tag_ids: &[i32],
) -> RepositoryResult<()> {
    use crate::schema::product_tags;

    diesel::delete(product_tags::table.filter(product_tags::product_id.eq(product_id)))
        .execute(conn)?;

    let unique_ids: BTreeSet<i32> = tag_ids.iter().copied().collect();
    if unique_ids.is_empty() {
        return Ok(());
    }

    let rows: Vec<NewProductTag> = unique_ids
        .into_iter()
        .map(|tag_id| NewProductTag::new(product_id, tag_id))
        .collect();

    diesel::insert_into(product_tags::table)
        .values(&rows)
        .execute(conn)?;

    Ok(())
}

fn single_product(conn: &mut SqliteConnection, db_product: DbProduct) -> RepositoryResult<DomainProduct> {
    hydrate_products(conn, vec![db_product])?
        .pop()
        .ok_or(RepositoryError::NotFound)
}

/// Attach tags and details to freshly loaded product rows, keeping their order.
fn hydrate_products(
    conn: &mut SqliteConnection,
    db_products: Vec<DbProduct>,
) -> RepositoryResult<Vec<DomainProduct>> {
    let product_ids: Vec<i32> = db_products.iter().map(|product| product.id).collect();
    let mut tags = load_tags_for_products(conn, &product_ids)?;
    let mut details = load_details_for_products(conn, &product_ids)?;

    let mut domain_products = Vec::with_capacity(db_products.len());
    for db_product in db_products {
        let mut domain: DomainProduct = db_product.into();
        domain.tags = tags.remove(&domain.id).unwrap_or_default();
        domain.detail = details.remove(&domain.id);
        domain_products.push(domain);
    }

    Ok(domain_products)
}

fn load_tags_for_products(
    conn: &mut SqliteConnection,
    product_ids: &[i32],
) -> RepositoryResult<HashMap<i32, Vec<DomainTag>>> {
    use crate::schema::{product_tags, tags};

    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = product_tags::table
        .inner_join(tags::table)
        .filter(product_tags::product_id.eq_any(product_ids))
        .order(tags::name.asc())
        .select((product_tags::product_id, DbTag::as_select()))
        .load::<(i32, DbTag)>(conn)?;

    let mut map: HashMap<i32, Vec<DomainTag>> = HashMap::new();
    for (product_id, tag) in rows {
        map.entry(product_id).or_default().push(tag.into());
    }

    Ok(map)
}

fn load_details_for_products(
    conn: &mut SqliteConnection,
    product_ids: &[i32],
) -> RepositoryResult<HashMap<i32, DomainProductDetail>> {
    use crate::schema::product_details;

    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = product_details::table
        .filter(product_details::product_id.eq_any(product_ids))
        .load::<DbProductDetail>(conn)?;

    Ok(rows
        .into_iter()
        .map(|row| (row.product_id, DomainProductDetail::from(row)))
        .collect())
}
