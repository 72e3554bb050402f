use diesel::prelude::*;

use crate::domain::brand::{Brand, NewBrand};
use crate::domain::types::{BrandId, BrandName};
use crate::models::brand::{Brand as DbBrand, NewBrand as DbNewBrand};
use crate::repository::{BrandReader, BrandWriter, DieselRepository, RepositoryResult};

impl BrandReader for DieselRepository {
    fn list_brands(&self) -> RepositoryResult<Vec<Brand>> {
        use crate::schema::brands;

        let mut conn = self.conn()?;

        let items = brands::table
            .order(brands::name.asc())
            .load::<DbBrand>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Brand>, _>>()?;

        Ok(items)
    }

    fn get_brand_by_id(&self, id: BrandId) -> RepositoryResult<Option<Brand>> {
        use crate::schema::brands;

        let mut conn = self.conn()?;

        let brand = brands::table
            .filter(brands::id.eq(id.get()))
            .first::<DbBrand>(&mut conn)
            .optional()?;

        Ok(brand.map(TryInto::try_into).transpose()?)
    }

    fn get_brand_by_name(&self, name: &BrandName) -> RepositoryResult<Option<Brand>> {
        use crate::schema::brands;

        let mut conn = self.conn()?;

        let brand = brands::table
            .filter(brands::name.eq(name.as_str()))
            .first::<DbBrand>(&mut conn)
            .optional()?;

        Ok(brand.map(TryInto::try_into).transpose()?)
    }
}

impl BrandWriter for DieselRepository {
    fn create_brand(&self, brand: &NewBrand) -> RepositoryResult<BrandId> {
        use crate::schema::brands;

        let mut conn = self.conn()?;
        let db_brand: DbNewBrand = brand.into();

        let id = diesel::insert_into(brands::table)
            .values(&db_brand)
            .returning(brands::id)
            .get_result::<i32>(&mut conn)?;

        Ok(BrandId::new(id)?)
    }

    fn update_brand(&self, id: BrandId, brand: &NewBrand) -> RepositoryResult<usize> {
        use crate::schema::brands;

        let mut conn = self.conn()?;
        let db_brand: DbNewBrand = brand.into();

        let affected = diesel::update(brands::table.filter(brands::id.eq(id.get())))
            .set((&db_brand, brands::updated_at.eq(diesel::dsl::now)))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn delete_brand(&self, id: BrandId) -> RepositoryResult<usize> {
        use crate::schema::brands;

        let mut conn = self.conn()?;

        let affected =
            diesel::delete(brands::table.filter(brands::id.eq(id.get()))).execute(&mut conn)?;

        Ok(affected)
    }
}
