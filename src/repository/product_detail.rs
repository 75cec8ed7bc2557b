use chrono::Local;
use diesel::dsl::{exists, select};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::product_detail::{Measurements, ProductDetail as DomainProductDetail};
use crate::models::product_detail::{
    NewProductDetail, ProductDetail as DbProductDetail, UpdateProductDetail,
};
use crate::repository::{
    DieselRepository, ProductDetailReader, ProductDetailWriter, RepositoryError,
    RepositoryResult,
};

impl ProductDetailReader for DieselRepository {
    fn get_product_detail(&self, product_id: i32) -> RepositoryResult<Option<DomainProductDetail>> {
        use crate::schema::product_details;

        let mut conn = self.conn()?;

        let detail = product_details::table
            .filter(product_details::product_id.eq(product_id))
            .first::<DbProductDetail>(&mut conn)
            .optional()?;

        Ok(detail.map(DomainProductDetail::from))
    }
}

impl ProductDetailWriter for DieselRepository {
    fn sync_product_detail(
        &self,
        product_id: i32,
        measurements: &Measurements,
    ) -> RepositoryResult<Option<DomainProductDetail>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        conn.transaction::<Option<DomainProductDetail>, RepositoryError, _>(|conn| {
            let product_exists =
                select(exists(products::table.filter(products::id.eq(product_id))))
                    .get_result::<bool>(conn)?;

            if !product_exists {
                return Err(RepositoryError::NotFound);
            }

            sync_detail(conn, product_id, measurements)
        })
    }
}

/// Upsert the detail record of `product_id` on an open connection.
///
/// Every measurement column is overwritten. Nothing is inserted when the
/// product has no detail yet and `measurements` is empty.
pub(crate) fn sync_detail(
    conn: &mut SqliteConnection,
    product_id: i32,
    measurements: &Measurements,
) -> RepositoryResult<Option<DomainProductDetail>> {
    use crate::schema::product_details;

    let changes = UpdateProductDetail::new(measurements, Local::now().naive_utc());

    let existing = product_details::table
        .filter(product_details::product_id.eq(product_id))
        .select(product_details::id)
        .first::<i32>(conn)
        .optional()?;

    match existing {
        Some(detail_id) => {
            let updated =
                diesel::update(product_details::table.filter(product_details::id.eq(detail_id)))
                    .set(&changes)
                    .get_result::<DbProductDetail>(conn)?;
            Ok(Some(updated.into()))
        }
        None if measurements.is_empty() => Ok(None),
        None => {
            // A concurrent first save may insert the row between the lookup and here.
            diesel::insert_into(product_details::table)
                .values(&NewProductDetail::new(product_id, measurements))
                .on_conflict(product_details::product_id)
                .do_update()
                .set(&changes)
                .execute(conn)?;

            let stored = product_details::table
                .filter(product_details::product_id.eq(product_id))
                .first::<DbProductDetail>(conn)?;
            Ok(Some(stored.into()))
        }
    }
}
