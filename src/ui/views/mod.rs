mod products;

pub use products::ProductsView;
