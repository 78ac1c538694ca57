//! Localized user-facing messages.
//!
//! Every error a caller can see is one of these variants. `Display` renders the
//! Arabic text (the primary locale) and [`Message::en`] gives the English one, so
//! an [`AppError`](crate::AppError) carrying a `Message` can emit both.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum Message {
    #[error("البريد الإلكتروني أو كلمة المرور غير صحيحة")]
    InvalidCredentials,
    #[error("يجب تسجيل الدخول أولاً")]
    Unauthenticated,
    #[error("انتهت صلاحية الجلسة، يرجى تسجيل الدخول مرة أخرى")]
    SessionExpired,
    #[error("ليس لديك صلاحية لتنفيذ هذا الإجراء")]
    Forbidden,
    #[error("المستخدم غير موجود")]
    UserNotFound,
    #[error("الدور غير موجود")]
    RoleNotFound,
    #[error("المورد غير موجود")]
    SupplierNotFound,
    #[error("أمر الشراء غير موجود")]
    PurchaseOrderNotFound,
    #[error("البريد الإلكتروني مستخدم بالفعل")]
    EmailTaken,
    #[error("يوجد دور بنفس الاسم بالفعل")]
    RoleNameTaken,
    #[error("لا يمكن حذف الدور لأنه مسند إلى مستخدمين نشطين")]
    RoleInUse,
    #[error("لا يمكن حذف المورد لوجود أوامر شراء مرتبطة به")]
    SupplierInUse,
    #[error("الصلاحية المطلوبة غير معروفة")]
    UnknownPermission,
    #[error("كلمة المرور الحالية غير صحيحة")]
    CurrentPasswordIncorrect,
    #[error("لا يمكن تغيير حالة أمر الشراء بهذا الشكل")]
    InvalidStatusTransition,
    #[error("لا يمكن تعديل أمر شراء بعد اعتماده")]
    PurchaseOrderLocked,
    #[error("بيانات الطلب غير صالحة")]
    InvalidRequestBody,
    #[error("البيانات المدخلة غير صالحة، يرجى مراجعة الحقول")]
    ValidationFailed,
    #[error("إجمالي أمر الشراء يتجاوز الحد المسموح به")]
    OrderTotalTooLarge,
    #[error("لا يمكنك تعطيل حسابك الخاص")]
    CannotDeactivateSelf,
    #[error("تم تجاوز عدد الطلبات المسموح به، حاول لاحقاً")]
    TooManyRequests,
    #[error("حدث خطأ غير متوقع، يرجى المحاولة لاحقاً")]
    InternalError,
}

impl Message {
    /// English rendering of the message.
    pub fn en(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Invalid email or password",
            Self::Unauthenticated => "Authentication required",
            Self::SessionExpired => "Session is invalid or has expired",
            Self::Forbidden => "You do not have permission to perform this action",
            Self::UserNotFound => "User not found",
            Self::RoleNotFound => "Role not found",
            Self::SupplierNotFound => "Supplier not found",
            Self::PurchaseOrderNotFound => "Purchase order not found",
            Self::EmailTaken => "Email is already in use",
            Self::RoleNameTaken => "A role with this name already exists",
            Self::RoleInUse => "Role is assigned to active users and cannot be deleted",
            Self::SupplierInUse => "Supplier has purchase orders and cannot be deleted",
            Self::UnknownPermission => "Unknown permission requested",
            Self::CurrentPasswordIncorrect => "Current password is incorrect",
            Self::InvalidStatusTransition => "Purchase order status change is not allowed",
            Self::PurchaseOrderLocked => "Purchase order can no longer be edited",
            Self::InvalidRequestBody => "Invalid request body",
            Self::ValidationFailed => "Some fields are invalid",
            Self::OrderTotalTooLarge => "Purchase order total is too large",
            Self::CannotDeactivateSelf => "You cannot deactivate your own account",
            Self::TooManyRequests => "Too many requests, please try again later",
            Self::InternalError => "An unexpected error occurred, please try again later",
        }
    }

    /// Arabic rendering of the message.
    pub fn ar(&self) -> String {
        self.to_string()
    }
}
