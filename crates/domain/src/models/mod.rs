//! Domain models.

pub mod audit_log;
pub mod reference;
pub mod statistics;
pub mod warranty;

pub use audit_log::{
    AuditAction, AuditContext, AuditLogResponse, ListAuditLogsQuery, ListAuditLogsResponse,
    NewAuditEntry,
};
pub use reference::{
    CategoryRecord, DepartmentRecord, ProfileRecord, SyncCategoriesRequest,
    SyncDepartmentsRequest, SyncProfilesRequest, SyncResponse,
};
pub use statistics::{DepartmentCount, StatusBreakdown, WarrantyStatistics};
pub use warranty::{
    days_until_expiry, is_warranty_active, resolve_warranty_window, ExpiringQuery,
    ExpiringWarrantiesResponse, ListWarrantiesQuery, ListWarrantiesResponse,
    NewWarrantyRegistration, Pagination,
    RegisterWarrantyRequest, RegisterWarrantyResponse, UpdateWarrantyStatusRequest,
    UpdateWarrantyStatusResponse, WarrantyCheckResponse, WarrantyRegistration, WarrantyResponse,
    WarrantyStatus,
};
