pub use masnaa_models::purchase_orders::{
    ClearPurchaseOrdersResponse, CreatePurchaseOrderDto, NextOrderNumberResponse,
    PaginatedPurchaseOrdersResponse, PurchaseOrder, PurchaseOrderDetail,
    PurchaseOrderFilterParams, PurchaseOrderItem, PurchaseOrderItemDto, PurchaseOrderStatus,
    PurchaseOrderSummary, UpdatePurchaseOrderDto,
};
