use crate::domain::draft::{DraftAction, ImageSlot, ProductDraft};
use crate::domain::product::NewProduct;
use crate::domain::storage::{ImageFile, UploadTarget};
use crate::domain::types::ProductId;
use crate::dto::brands::BrandDto;
use crate::dto::categories::CategoryDto;
use crate::dto::products::{ProductDto, ProductEditorDto};
use crate::repository::{
    BrandReader, CategoryReader, ProductListQuery, ProductReader, ProductWriter,
};
use crate::services::drafts::DraftStore;
use crate::services::storage::{StorageBootstrap, upload_images};
use crate::storage::ObjectStorage;

use super::{ServiceError, ServiceResult};

/// Products for the list page, newest first, optionally filtered by `search`.
pub fn show_products<R>(search: Option<&str>, repo: &R) -> ServiceResult<Vec<ProductDto>>
where
    R: ProductReader,
{
    let query = match search {
        Some(search) => ProductListQuery::default().search(search),
        None => ProductListQuery::default(),
    };

    match repo.list_products(query) {
        Ok(products) => Ok(products.into_iter().map(ProductDto::from).collect()),
        Err(e) => {
            log::error!("Failed to list products: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn delete_product<R>(product_id: i32, repo: &R) -> ServiceResult<()>
where
    R: ProductWriter,
{
    let product_id = ProductId::new(product_id).map_err(|_| ServiceError::NotFound)?;

    match repo.delete_product(product_id) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Failed to delete product: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Opens a draft: empty for a new product, hydrated from storage for an edit.
pub fn start_draft<R>(product_id: Option<i32>, repo: &R) -> ServiceResult<ProductDraft>
where
    R: ProductReader,
{
    let Some(product_id) = product_id else {
        return Ok(ProductDraft::new());
    };
    let product_id = ProductId::new(product_id).map_err(|_| ServiceError::NotFound)?;

    match repo.get_product_by_id(product_id) {
        Ok(Some(product)) => Ok(ProductDraft::from_product(&product)),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get product: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Runs `actions` through the reducer in order.
///
/// The caller keeps its copy of the draft when this fails.
pub fn apply_draft_actions(
    draft: ProductDraft,
    actions: impl IntoIterator<Item = DraftAction>,
) -> ServiceResult<ProductDraft> {
    actions
        .into_iter()
        .try_fold(draft, |draft, action| draft.apply(action))
        .map_err(ServiceError::from)
}

/// Builds the editor view, including derived prices and combo candidates.
pub fn show_editor<R>(draft: &ProductDraft, repo: &R) -> ServiceResult<ProductEditorDto>
where
    R: ProductReader + CategoryReader + BrandReader,
{
    let catalog = repo.list_products(ProductListQuery::default()).map_err(|e| {
        log::error!("Failed to list products for combo picker: {e}");
        ServiceError::Internal
    })?;
    let categories = repo.list_categories().map_err(|e| {
        log::error!("Failed to list categories: {e}");
        ServiceError::Internal
    })?;
    let brands = repo.list_brands().map_err(|e| {
        log::error!("Failed to list brands: {e}");
        ServiceError::Internal
    })?;

    Ok(ProductEditorDto::new(
        draft,
        &catalog,
        categories.into_iter().map(CategoryDto::from).collect(),
        brands.into_iter().map(BrandDto::from).collect(),
    ))
}

/// Checks references the form model cannot check on its own.
fn resolve_references<R>(mut product: NewProduct, repo: &R) -> ServiceResult<NewProduct>
where
    R: ProductReader + CategoryReader + BrandReader,
{
    let category = match repo.get_category_by_name(&product.category) {
        Ok(Some(category)) => category,
        Ok(None) => {
            return Err(ServiceError::Form(format!(
                "Category '{}' does not exist",
                product.category
            )));
        }
        Err(e) => {
            log::error!("Failed to get category: {e}");
            return Err(ServiceError::Internal);
        }
    };
    if !category.has_subcategory(&product.subcategory) {
        return Err(ServiceError::Form(format!(
            "Subcategory '{}' does not belong to category '{}'",
            product.subcategory, category.name
        )));
    }
    product.category = category.name;

    if let Some(brand) = product.brand.take() {
        product.brand = match repo.get_brand_by_name(&brand) {
            Ok(Some(stored)) => Some(stored.name),
            Ok(None) => {
                return Err(ServiceError::Form(format!("Brand '{brand}' does not exist")));
            }
            Err(e) => {
                log::error!("Failed to get brand: {e}");
                return Err(ServiceError::Internal);
            }
        };
    }

    for member in &product.combo_products {
        match repo.get_product_by_id(*member) {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Err(ServiceError::Form(format!(
                    "Combo product #{member} no longer exists"
                )));
            }
            Err(e) => {
                log::error!("Failed to get combo product: {e}");
                return Err(ServiceError::Internal);
            }
        }
    }

    Ok(product)
}

/// Validates the draft and issues exactly one create or update.
///
/// Returns the id of the stored product.
pub fn submit_draft<R>(draft: &ProductDraft, repo: &R) -> ServiceResult<ProductId>
where
    R: ProductReader + ProductWriter + CategoryReader + BrandReader,
{
    let product = draft.normalize()?;
    let product = resolve_references(product, repo)?;

    match draft.id() {
        Some(id) => match repo.update_product(id, &product) {
            Ok(0) => Err(ServiceError::NotFound),
            Ok(_) => Ok(id),
            Err(e) => {
                log::error!("Failed to update product: {e}");
                Err(ServiceError::Internal)
            }
        },
        None => repo.create_product(&product).map_err(|e| {
            log::error!("Failed to create product: {e}");
            ServiceError::Internal
        }),
    }
}

/// Uploads images into a slot of the draft stored under `draft_key`.
///
/// Capacity is checked before anything is uploaded; nothing is merged unless
/// every file was stored. The URLs are merged into the draft as it is once
/// the upload finishes, keeping edits saved while it ran.
pub async fn upload_draft_images<S>(
    drafts: &DraftStore,
    draft_key: &str,
    slot: ImageSlot,
    files: Vec<ImageFile>,
    bootstrap: &StorageBootstrap,
    storage: &S,
) -> ServiceResult<ProductDraft>
where
    S: ObjectStorage + ?Sized,
{
    let draft = drafts.get(draft_key).ok_or(ServiceError::NotFound)?;
    draft.check_capacity(slot, files.len())?;

    let urls = upload_images(files, UploadTarget::ProductImage, bootstrap, storage).await?;

    match drafts.update(draft_key, |latest| {
        latest.apply(DraftAction::MergeImages(slot, urls))
    }) {
        Some(result) => Ok(result?),
        None => {
            log::warn!("Product draft closed while its images were uploading");
            Err(ServiceError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::brand::Brand;
    use crate::domain::category::Category;
    use crate::domain::draft::DraftField;
    use crate::domain::product::Product;
    use crate::domain::storage::{BucketConfig, PRODUCT_IMAGES_BUCKET};
    use crate::domain::types::{
        BrandId, BrandName, BucketName, CategoryId, CategoryName, ProductName, ProductPrice,
        SubcategoryName,
    };
    use crate::repository::test::TestRepository;
    use crate::storage::test::TestStorage;
    use chrono::DateTime;

    fn sample_category() -> Category {
        Category {
            id: CategoryId::new(1).unwrap(),
            name: CategoryName::new("racquets").unwrap(),
            subcategories: vec![
                SubcategoryName::new("Tennis").unwrap(),
                SubcategoryName::new("Badminton").unwrap(),
            ],
            created_at: DateTime::from_timestamp(0, 0).unwrap().naive_utc(),
            updated_at: DateTime::from_timestamp(0, 0).unwrap().naive_utc(),
        }
    }

    fn sample_brand() -> Brand {
        Brand {
            id: BrandId::new(1).unwrap(),
            name: BrandName::new("Wilson").unwrap(),
            logo_url: None,
            created_at: DateTime::from_timestamp(0, 0).unwrap().naive_utc(),
            updated_at: DateTime::from_timestamp(0, 0).unwrap().naive_utc(),
        }
    }

    fn sample_product(id: i32, price: f64) -> Product {
        Product {
            id: ProductId::new(id).unwrap(),
            name: ProductName::new(format!("Product {id}")).unwrap(),
            category: CategoryName::new("racquets").unwrap(),
            subcategory: SubcategoryName::new("tennis").unwrap(),
            brand: None,
            price: ProductPrice::new(price).unwrap(),
            description: String::new(),
            image_url: None,
            additional_images: vec![],
            discount_percentage: None,
            discounted_price: None,
            is_combo: false,
            combo_products: vec![],
            created_at: DateTime::from_timestamp(id as i64, 0).unwrap().naive_utc(),
            updated_at: DateTime::from_timestamp(id as i64, 0).unwrap().naive_utc(),
        }
    }

    fn repo() -> TestRepository {
        TestRepository::new(
            vec![sample_product(1, 100000.0), sample_product(2, 250000.0)],
            vec![sample_category()],
            vec![sample_brand()],
        )
    }

    fn set(field: DraftField, value: &str) -> DraftAction {
        DraftAction::SetField(field, value.to_string())
    }

    fn tennis_racket() -> ProductDraft {
        apply_draft_actions(
            ProductDraft::new(),
            [
                set(DraftField::Name, "Tennis Racket"),
                set(DraftField::Category, "racquets"),
                set(DraftField::Subcategory, "tennis"),
                set(DraftField::Price, "500000"),
                set(DraftField::DiscountPercentage, "10"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn submit_creates_product_with_discounted_price() {
        let repo = repo();

        let id = submit_draft(&tennis_racket(), &repo).unwrap();

        assert_eq!(repo.writes(), 1);
        let stored = repo.get_product_by_id(id).unwrap().unwrap();
        assert_eq!(stored.name.as_str(), "Tennis Racket");
        assert_eq!(stored.discounted_price.unwrap().get(), 450000.0);
        assert!(stored.combo_products.is_empty());
    }

    #[test]
    fn submit_updates_existing_product() {
        let repo = repo();
        let draft = start_draft(Some(2), &repo).unwrap();
        let draft = apply_draft_actions(draft, [set(DraftField::Price, "199000")]).unwrap();

        let id = submit_draft(&draft, &repo).unwrap();

        assert_eq!(id.get(), 2);
        assert_eq!(repo.products().len(), 2);
        let stored = repo.get_product_by_id(id).unwrap().unwrap();
        assert_eq!(stored.price.get(), 199000.0);
    }

    #[test]
    fn submit_with_missing_field_writes_nothing() {
        let repo = repo();
        let draft = apply_draft_actions(tennis_racket(), [set(DraftField::Name, " ")]).unwrap();

        let err = submit_draft(&draft, &repo).unwrap_err();

        assert_eq!(err, ServiceError::Form("name is required".to_string()));
        assert_eq!(repo.writes(), 0);
    }

    #[test]
    fn submit_rejects_foreign_subcategory() {
        let repo = repo();
        let draft =
            apply_draft_actions(tennis_racket(), [set(DraftField::Subcategory, "running")])
                .unwrap();

        assert!(matches!(
            submit_draft(&draft, &repo),
            Err(ServiceError::Form(_))
        ));
        assert_eq!(repo.writes(), 0);
    }

    #[test]
    fn submit_canonicalizes_brand_name() {
        let repo = repo();
        let draft = apply_draft_actions(tennis_racket(), [set(DraftField::Brand, "wilson")]).unwrap();

        let id = submit_draft(&draft, &repo).unwrap();
        let stored = repo.get_product_by_id(id).unwrap().unwrap();
        assert_eq!(stored.brand.unwrap().as_str(), "Wilson");
    }

    #[test]
    fn submit_rejects_unknown_brand() {
        let repo = repo();
        let draft = apply_draft_actions(tennis_racket(), [set(DraftField::Brand, "Acme")]).unwrap();

        assert_eq!(
            submit_draft(&draft, &repo),
            Err(ServiceError::Form("Brand 'Acme' does not exist".to_string()))
        );
    }

    #[test]
    fn non_combo_submit_stores_no_members() {
        let repo = repo();
        let draft = apply_draft_actions(
            tennis_racket(),
            [
                DraftAction::SetCombo(true),
                DraftAction::ToggleComboProduct(ProductId::new(1).unwrap()),
                DraftAction::SetCombo(false),
            ],
        )
        .unwrap();

        let id = submit_draft(&draft, &repo).unwrap();
        let stored = repo.get_product_by_id(id).unwrap().unwrap();
        assert!(!stored.is_combo);
        assert!(stored.combo_products.is_empty());
    }

    #[test]
    fn editor_shows_combo_subtotal_and_candidates() {
        let repo = repo();
        let draft = apply_draft_actions(
            ProductDraft::new(),
            [
                set(DraftField::Category, "racquets"),
                DraftAction::SetCombo(true),
                DraftAction::ToggleComboProduct(ProductId::new(1).unwrap()),
                DraftAction::ToggleComboProduct(ProductId::new(2).unwrap()),
            ],
        )
        .unwrap();

        let view = show_editor(&draft, &repo).unwrap();

        assert_eq!(view.combo_subtotal_display, "350.000 ₫");
        assert_eq!(view.combo_selected.len(), 2);
        assert!(view.combo_available.is_empty());
        assert_eq!(view.subcategories, vec!["Tennis", "Badminton"]);
    }

    #[test]
    fn editor_excludes_edited_product_from_candidates() {
        let repo = repo();
        let draft = start_draft(Some(1), &repo).unwrap();

        let view = show_editor(&draft, &repo).unwrap();

        let ids: Vec<i32> = view.combo_available.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn failed_action_leaves_callers_draft_untouched() {
        let draft = tennis_racket();
        let urls = (0..5)
            .map(|i| {
                crate::domain::types::ImageUrl::new(format!("https://cdn.test/{i}.png")).unwrap()
            })
            .collect();

        let result = apply_draft_actions(
            draft.clone(),
            [DraftAction::MergeImages(ImageSlot::Gallery, urls)],
        );

        assert!(matches!(result, Err(ServiceError::Form(_))));
        assert!(draft.additional_images().is_empty());
    }

    #[test]
    fn start_draft_for_missing_product_is_not_found() {
        assert_eq!(start_draft(Some(42), &repo()), Err(ServiceError::NotFound));
    }

    #[test]
    fn list_filters_by_search_term() {
        let repo = repo();
        let all = show_products(None, &repo).unwrap();
        assert_eq!(all.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2, 1]);

        let filtered = show_products(Some("product 1"), &repo).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].price_display, "100.000 ₫");
    }

    #[test]
    fn delete_missing_product_is_not_found() {
        let repo = repo();
        assert_eq!(delete_product(7, &repo), Err(ServiceError::NotFound));
        assert!(delete_product(1, &repo).is_ok());
        assert_eq!(repo.products().len(), 1);
    }

    fn bucket() -> BucketConfig {
        BucketConfig::product_images(BucketName::new(PRODUCT_IMAGES_BUCKET).unwrap())
    }

    fn open_draft(drafts: &DraftStore, draft: ProductDraft) -> String {
        let key = DraftStore::new_key();
        drafts.put(&key, draft);
        key
    }

    fn png(name: &str, first_byte: u8) -> ImageFile {
        ImageFile::new(name, Some("image/png"), vec![first_byte, 0])
    }

    #[actix_web::test]
    async fn gallery_upload_merges_urls_in_selection_order() {
        let storage = TestStorage::new().with_bucket(bucket());
        let bootstrap = StorageBootstrap::new(bucket());
        let drafts = DraftStore::default();
        let key = open_draft(&drafts, ProductDraft::new());

        let draft = upload_draft_images(
            &drafts,
            &key,
            ImageSlot::Gallery,
            vec![png("first.png", 3), png("second.png", 0)],
            &bootstrap,
            &storage,
        )
        .await
        .unwrap();

        let objects = storage.objects();
        assert_eq!(draft.additional_images().len(), 2);
        let first = objects.iter().find(|o| o.bytes[0] == 3).unwrap();
        assert!(draft.additional_images()[0].as_str().ends_with(&first.path));
        assert_eq!(drafts.get(&key), Some(draft));
    }

    #[actix_web::test]
    async fn edits_saved_during_upload_are_kept() {
        let storage = TestStorage::new().with_bucket(bucket());
        let bootstrap = StorageBootstrap::new(bucket());
        let drafts = DraftStore::default();
        let key = open_draft(&drafts, ProductDraft::new());
        let edited = ProductDraft::new()
            .apply(DraftAction::SetField(DraftField::Name, "Grip tape".into()))
            .unwrap();

        // The upload yields before storing, letting the edit land first.
        let (uploaded, ()) = futures::join!(
            upload_draft_images(
                &drafts,
                &key,
                ImageSlot::Primary,
                vec![png("main.png", 3)],
                &bootstrap,
                &storage,
            ),
            async { drafts.put(&key, edited.clone()) },
        );

        let draft = uploaded.unwrap();
        assert_eq!(draft.field(DraftField::Name), "Grip tape");
        assert!(draft.primary_image().is_some());
        assert_eq!(drafts.get(&key), Some(draft));
    }

    #[actix_web::test]
    async fn upload_without_open_draft_is_not_found() {
        let storage = TestStorage::new().with_bucket(bucket());
        let bootstrap = StorageBootstrap::new(bucket());
        let drafts = DraftStore::default();

        let err = upload_draft_images(
            &drafts,
            "missing",
            ImageSlot::Gallery,
            vec![png("a.png", 0)],
            &bootstrap,
            &storage,
        )
        .await
        .unwrap_err();

        assert_eq!(err, ServiceError::NotFound);
        assert_eq!(storage.upload_calls(), 0);
    }

    #[actix_web::test]
    async fn upload_over_capacity_is_rejected_before_storage() {
        let storage = TestStorage::new().with_bucket(bucket());
        let bootstrap = StorageBootstrap::new(bucket());
        let drafts = DraftStore::default();
        let key = open_draft(&drafts, ProductDraft::new());
        let files = (0..5).map(|i| png(&format!("{i}.png"), 0)).collect();

        let err = upload_draft_images(
            &drafts,
            &key,
            ImageSlot::Gallery,
            files,
            &bootstrap,
            &storage,
        )
        .await
        .unwrap_err();

        assert_eq!(
            err,
            ServiceError::Form("additional images accepts only 4 more image(s)".to_string())
        );
        assert_eq!(storage.upload_calls(), 0);
    }

    #[actix_web::test]
    async fn failed_batch_merges_nothing() {
        let storage = TestStorage::new()
            .with_bucket(bucket())
            .failing_uploads_marked(1);
        let bootstrap = StorageBootstrap::new(bucket());
        let drafts = DraftStore::default();
        let key = open_draft(&drafts, ProductDraft::new());

        let result = upload_draft_images(
            &drafts,
            &key,
            ImageSlot::Gallery,
            vec![png("ok.png", 0), png("bad.png", 1)],
            &bootstrap,
            &storage,
        )
        .await;

        assert!(matches!(result, Err(ServiceError::StorageUnavailable(_))));
        assert_eq!(drafts.get(&key), Some(ProductDraft::new()));
    }
}
