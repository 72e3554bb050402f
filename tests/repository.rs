use storefront_admin::domain::brand::NewBrand;
use storefront_admin::domain::category::NewCategory;
use storefront_admin::domain::product::NewProduct;
use storefront_admin::domain::types::{
    BrandName, CategoryName, DiscountPercentage, ImageUrl, ProductId, ProductName, ProductPrice,
    SubcategoryName,
};
use storefront_admin::repository::{
    BrandReader, BrandWriter, CategoryReader, CategoryWriter, DieselRepository, ProductListQuery,
    ProductReader, ProductWriter, RepositoryError,
};

mod common;

fn seed_category(repo: &DieselRepository, name: &str, subcategories: &[&str]) {
    let category = NewCategory {
        name: CategoryName::new(name).unwrap(),
        subcategories: subcategories
            .iter()
            .map(|s| SubcategoryName::new(*s).unwrap())
            .collect(),
    };
    repo.create_category(&category).expect("should create category");
}

fn new_product(name: &str, category: &str, subcategory: &str, price: f64) -> NewProduct {
    NewProduct {
        name: ProductName::new(name).unwrap(),
        category: CategoryName::new(category).unwrap(),
        subcategory: SubcategoryName::new(subcategory).unwrap(),
        brand: None,
        price: ProductPrice::new(price).unwrap(),
        description: String::new(),
        image_url: None,
        additional_images: Vec::new(),
        discount_percentage: None,
        discounted_price: None,
        is_combo: false,
        combo_products: Vec::new(),
    }
}

#[test]
fn product_crud_roundtrip_keeps_images_and_discount() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();
    seed_category(&repo, "Running", &["Shoes"]);

    let mut product = new_product("Trail runner", "running", "Shoes", 500_000.0);
    product.image_url = Some(ImageUrl::new("https://cdn.test/a.png").unwrap());
    product.additional_images = vec![
        ImageUrl::new("https://cdn.test/b.png").unwrap(),
        ImageUrl::new("https://cdn.test/c.png").unwrap(),
    ];
    let discount = DiscountPercentage::new(10.0).unwrap();
    product.discount_percentage = Some(discount);
    product.discounted_price = Some(discount.apply(product.price));

    let id = repo.create_product(&product).expect("should create product");
    let stored = repo
        .get_product_by_id(id)
        .expect("should read product")
        .expect("product should exist");

    assert_eq!(stored.name.as_str(), "Trail runner");
    assert_eq!(stored.image_url, product.image_url);
    assert_eq!(stored.additional_images, product.additional_images);
    assert_eq!(stored.discounted_price.map(|p| p.get()), Some(450_000.0));

    product.additional_images.reverse();
    product.discount_percentage = None;
    product.discounted_price = None;
    assert_eq!(repo.update_product(id, &product).unwrap(), 1);

    let updated = repo.get_product_by_id(id).unwrap().unwrap();
    assert_eq!(updated.additional_images, product.additional_images);
    assert!(updated.discounted_price.is_none());

    assert_eq!(repo.delete_product(id).unwrap(), 1);
    assert!(repo.get_product_by_id(id).unwrap().is_none());
}

#[test]
fn update_of_missing_product_touches_nothing() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();
    seed_category(&repo, "Running", &["Shoes"]);

    let product = new_product("Ghost", "running", "Shoes", 1.0);
    let affected = repo
        .update_product(ProductId::new(999).unwrap(), &product)
        .expect("update should not fail");

    assert_eq!(affected, 0);
}

#[test]
fn combo_members_roundtrip_in_order_and_follow_deletes() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();
    seed_category(&repo, "Football", &["Balls", "Combos"]);

    let ball = repo
        .create_product(&new_product("Ball", "football", "Balls", 300_000.0))
        .unwrap();
    let pump = repo
        .create_product(&new_product("Pump", "football", "Balls", 100_000.0))
        .unwrap();

    let mut combo = new_product("Ball + pump", "football", "Combos", 350_000.0);
    combo.is_combo = true;
    combo.combo_products = vec![pump, ball];
    let combo_id = repo.create_product(&combo).unwrap();

    let stored = repo.get_product_by_id(combo_id).unwrap().unwrap();
    assert!(stored.is_combo);
    assert_eq!(stored.combo_products, vec![pump, ball]);

    repo.delete_product(pump).unwrap();
    let stored = repo.get_product_by_id(combo_id).unwrap().unwrap();
    assert_eq!(stored.combo_products, vec![ball]);
}

#[test]
fn search_matches_name_category_and_subcategory() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();
    seed_category(&repo, "Running", &["Shoes"]);
    seed_category(&repo, "Swimming", &["Goggles"]);

    repo.create_product(&new_product("Trail runner", "running", "Shoes", 1.0))
        .unwrap();
    repo.create_product(&new_product("Anti-fog", "swimming", "Goggles", 1.0))
        .unwrap();

    let by_name = repo
        .list_products(ProductListQuery::default().search("TRAIL"))
        .unwrap();
    assert_eq!(by_name.len(), 1);

    let by_subcategory = repo
        .list_products(ProductListQuery::default().search("goggles"))
        .unwrap();
    assert_eq!(by_subcategory.len(), 1);
    assert_eq!(by_subcategory[0].name.as_str(), "Anti-fog");

    let all = repo
        .list_products(ProductListQuery::default().search("   "))
        .unwrap();
    assert_eq!(all.len(), 2);
    // Newest first.
    assert_eq!(all[0].name.as_str(), "Anti-fog");
}

#[test]
fn category_names_are_unique_ignoring_case() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();
    seed_category(&repo, "Running", &[]);

    let duplicate = NewCategory {
        name: CategoryName::new("RUNNING").unwrap(),
        subcategories: Vec::new(),
    };
    let result = repo.create_category(&duplicate);

    assert!(matches!(result, Err(RepositoryError::UniqueViolation(_))));
}

#[test]
fn renaming_category_updates_its_products() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();
    seed_category(&repo, "Runing", &["Shoes"]);
    let product_id = repo
        .create_product(&new_product("Trail runner", "runing", "Shoes", 1.0))
        .unwrap();

    let category = repo
        .get_category_by_name(&CategoryName::new("Runing").unwrap())
        .unwrap()
        .unwrap();
    repo.rename_category(category.id, &CategoryName::new("Running").unwrap())
        .unwrap();

    let product = repo.get_product_by_id(product_id).unwrap().unwrap();
    assert_eq!(product.category.as_str(), "running");
}

#[test]
fn subcategories_keep_their_order() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();
    seed_category(&repo, "Running", &["Shoes"]);
    let category = repo.list_categories().unwrap().remove(0);

    let ordered = ["Socks", "Shoes", "Bottles"]
        .iter()
        .map(|s| SubcategoryName::new(*s).unwrap())
        .collect::<Vec<_>>();
    repo.set_subcategories(category.id, &ordered).unwrap();

    let category = repo.get_category_by_id(category.id).unwrap().unwrap();
    assert_eq!(category.subcategories, ordered);
}

#[test]
fn category_in_use_cannot_be_deleted() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();
    seed_category(&repo, "Running", &["Shoes"]);
    repo.create_product(&new_product("Trail runner", "running", "Shoes", 1.0))
        .unwrap();
    let category = repo.list_categories().unwrap().remove(0);

    let result = repo.delete_category(category.id);

    assert!(matches!(result, Err(RepositoryError::ConstraintViolation(_))));
    assert!(repo.get_category_by_id(category.id).unwrap().is_some());
}

#[test]
fn brand_crud_and_in_use_protection() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();
    seed_category(&repo, "Running", &["Shoes"]);

    let brand_id = repo
        .create_brand(&NewBrand {
            name: BrandName::new("Nike").unwrap(),
            logo_url: None,
        })
        .unwrap();
    let found = repo
        .get_brand_by_name(&BrandName::new("nike").unwrap())
        .unwrap()
        .expect("lookup ignores case");
    assert_eq!(found.id, brand_id);

    let logo = ImageUrl::new("https://cdn.test/nike.png").unwrap();
    repo.update_brand(
        brand_id,
        &NewBrand {
            name: BrandName::new("Nike").unwrap(),
            logo_url: Some(logo.clone()),
        },
    )
    .unwrap();
    assert_eq!(
        repo.get_brand_by_id(brand_id).unwrap().unwrap().logo_url,
        Some(logo)
    );

    let mut product = new_product("Pegasus", "running", "Shoes", 1.0);
    product.brand = Some(BrandName::new("Nike").unwrap());
    let product_id = repo.create_product(&product).unwrap();

    let result = repo.delete_brand(brand_id);
    assert!(matches!(result, Err(RepositoryError::ConstraintViolation(_))));

    repo.delete_product(product_id).unwrap();
    assert_eq!(repo.delete_brand(brand_id).unwrap(), 1);
    assert!(repo.list_brands().unwrap().is_empty());
}

#[test]
fn search_treats_wildcards_literally() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();
    seed_category(&repo, "Apparel", &["Shirts"]);

    repo.create_product(&new_product("100% cotton tee", "apparel", "Shirts", 1.0))
        .unwrap();
    repo.create_product(&new_product("1000 thread shirt", "apparel", "Shirts", 1.0))
        .unwrap();
    repo.create_product(&new_product("pro_tank top", "apparel", "Shirts", 1.0))
        .unwrap();

    let percent = repo
        .list_products(ProductListQuery::default().search("100%"))
        .unwrap();
    assert_eq!(percent.len(), 1);
    assert_eq!(percent[0].name.as_str(), "100% cotton tee");

    let underscore = repo
        .list_products(ProductListQuery::default().search("o_t"))
        .unwrap();
    assert_eq!(underscore.len(), 1);
    assert_eq!(underscore[0].name.as_str(), "pro_tank top");

    let nothing = repo
        .list_products(ProductListQuery::default().search("_%_"))
        .unwrap();
    assert!(nothing.is_empty());
}
