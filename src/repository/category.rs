use diesel::prelude::*;

use crate::db::DbConnection;
use crate::domain::category::{Category, NewCategory};
use crate::domain::types::{CategoryId, CategoryName, SubcategoryName};
use crate::models::category::{
    Category as DbCategory, NewCategory as DbNewCategory, NewSubcategory, Subcategory,
};
use crate::repository::{CategoryReader, CategoryWriter, DieselRepository, RepositoryResult};

fn load_with_subcategories(
    conn: &mut DbConnection,
    rows: Vec<DbCategory>,
) -> RepositoryResult<Vec<Category>> {
    use crate::schema::subcategories;

    let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
    let mut subs = subcategories::table
        .filter(subcategories::category_id.eq_any(&ids))
        .order((subcategories::position.asc(), subcategories::id.asc()))
        .load::<Subcategory>(conn)?;

    let categories = rows
        .into_iter()
        .map(|row| {
            let (own, rest): (Vec<_>, Vec<_>) =
                std::mem::take(&mut subs).into_iter().partition(|s| s.category_id == row.id);
            subs = rest;
            row.into_domain(own)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(categories)
}

fn insert_subcategories(
    conn: &mut DbConnection,
    category_id: i32,
    subcategories: &[SubcategoryName],
) -> QueryResult<()> {
    use crate::schema::subcategories;

    let rows: Vec<NewSubcategory> = subcategories
        .iter()
        .enumerate()
        .map(|(position, name)| NewSubcategory {
            category_id,
            name: name.as_str(),
            position: position as i32,
        })
        .collect();
    if !rows.is_empty() {
        diesel::insert_into(subcategories::table)
            .values(&rows)
            .execute(conn)?;
    }
    Ok(())
}

impl CategoryReader for DieselRepository {
    fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let rows = categories::table
            .order(categories::name.asc())
            .load::<DbCategory>(&mut conn)?;

        load_with_subcategories(&mut conn, rows)
    }

    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let row = categories::table
            .filter(categories::id.eq(id.get()))
            .first::<DbCategory>(&mut conn)
            .optional()?;

        match row {
            Some(row) => Ok(load_with_subcategories(&mut conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn get_category_by_name(&self, name: &CategoryName) -> RepositoryResult<Option<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        // The column is declared COLLATE NOCASE.
        let row = categories::table
            .filter(categories::name.eq(name.as_str()))
            .first::<DbCategory>(&mut conn)
            .optional()?;

        match row {
            Some(row) => Ok(load_with_subcategories(&mut conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }
}

impl CategoryWriter for DieselRepository {
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<CategoryId> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let id = conn.transaction(|conn| {
            let id = diesel::insert_into(categories::table)
                .values(DbNewCategory {
                    name: category.name.as_str(),
                })
                .returning(categories::id)
                .get_result::<i32>(conn)?;
            insert_subcategories(conn, id, &category.subcategories)?;
            QueryResult::Ok(id)
        })?;

        Ok(CategoryId::new(id)?)
    }

    fn rename_category(&self, id: CategoryId, name: &CategoryName) -> RepositoryResult<usize> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        // Products follow through ON UPDATE CASCADE.
        let affected = diesel::update(categories::table.filter(categories::id.eq(id.get())))
            .set((
                categories::name.eq(name.as_str()),
                categories::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn set_subcategories(
        &self,
        id: CategoryId,
        subcategories: &[SubcategoryName],
    ) -> RepositoryResult<usize> {
        use crate::schema::{categories, subcategories as subs};

        let mut conn = self.conn()?;

        let affected = conn.transaction(|conn| {
            let affected = diesel::update(categories::table.filter(categories::id.eq(id.get())))
                .set(categories::updated_at.eq(diesel::dsl::now))
                .execute(conn)?;
            if affected > 0 {
                diesel::delete(subs::table.filter(subs::category_id.eq(id.get()))).execute(conn)?;
                insert_subcategories(conn, id.get(), subcategories)?;
            }
            QueryResult::Ok(affected)
        })?;

        Ok(affected)
    }

    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let affected = diesel::delete(categories::table.filter(categories::id.eq(id.get())))
            .execute(&mut conn)?;

        Ok(affected)
    }
}
