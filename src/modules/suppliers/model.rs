pub use masnaa_models::suppliers::{
    CreateSupplierDto, PaginatedSuppliersResponse, Supplier, SupplierFilterParams,
    UpdateSupplierDto,
};
pub use masnaa_models::users::SetActiveDto;
