pub mod banned_ingredient;
pub mod company;
pub mod company_metrics;
pub mod ingredient_metrics;
pub mod product;
pub mod product_ingredient;
pub mod recommended_alternative;

pub use banned_ingredient::Entity as BannedIngredient;
pub use company::Entity as Company;
pub use company_metrics::Entity as CompanyMetrics;
pub use ingredient_metrics::Entity as IngredientMetrics;
pub use product::Entity as Product;
pub use product_ingredient::Entity as ProductIngredient;
pub use recommended_alternative::Entity as RecommendedAlternative;
