use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::category::Category as DomainCategory;
use crate::domain::types::{CategoryName, SubcategoryName, TypeConstraintError};

/// Diesel model representing the `categories` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::categories)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::categories)]
pub struct NewCategory<'a> {
    pub name: &'a str,
}

/// Diesel model representing the `subcategories` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::subcategories)]
pub struct Subcategory {
    pub id: i32,
    pub category_id: i32,
    pub name: String,
    pub position: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::subcategories)]
pub struct NewSubcategory<'a> {
    pub category_id: i32,
    pub name: &'a str,
    pub position: i32,
}

impl Category {
    pub fn into_domain(
        self,
        subcategories: Vec<Subcategory>,
    ) -> Result<DomainCategory, TypeConstraintError> {
        Ok(DomainCategory {
            id: self.id.try_into()?,
            name: CategoryName::new(self.name)?,
            subcategories: subcategories
                .into_iter()
                .map(|sub| SubcategoryName::new(sub.name))
                .collect::<Result<Vec<_>, _>>()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
