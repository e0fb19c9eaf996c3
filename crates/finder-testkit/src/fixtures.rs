//! Shared test data.
//!
//! One small campus: three accounts, three categories, two campuses.

use chrono::NaiveDate;
use finder_app::workflows::ItemDraft;
use finder_app::Registration;
use finder_core::{
    Category, CategoryId, Claim, ClaimId, ClaimStatus, Department, DepartmentId, Item, ItemId,
    ItemStatus, User, UserId,
};

/// Password shared by every fixture account.
pub const PASSWORD: &str = "wildcats123";

/// Build a user with a first and last name.
pub fn user(id: i64, username: &str, role: &str, first: &str, last: &str) -> User {
    let mut user = User::new(UserId(id), username, role);
    user.first_name = Some(first.to_string());
    user.last_name = Some(last.to_string());
    user.email = Some(username.to_string());
    user
}

/// Ordinary user who reports items.
pub fn alice() -> User {
    user(1, "alice@cit.edu", "USER", "Alice", "Reyes")
}

/// Ordinary user who files claims.
pub fn bob() -> User {
    user(2, "bob@cit.edu", "USER", "Bob", "Santos")
}

/// Administrator.
pub fn admin() -> User {
    user(9, "admin@cit.edu", "ADMIN", "Ada", "Cruz")
}

/// Category list.
pub fn categories() -> Vec<Category> {
    [(1, "Bags"), (2, "Electronics"), (3, "Documents")]
        .into_iter()
        .map(|(id, name)| Category {
            category_id: CategoryId(id),
            category_name: name.to_string(),
            description: None,
        })
        .collect()
}

/// Campus list.
pub fn departments() -> Vec<Department> {
    [(1, "Main Campus"), (2, "Banilad Campus")]
        .into_iter()
        .map(|(id, name)| Department {
            department_id: DepartmentId(id),
            name: name.to_string(),
            location: None,
        })
        .collect()
}

/// A report date inside the fixture semester.
pub fn report_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 11, 4).unwrap_or_default()
}

/// A bag at Main Campus reported by `reporter`.
pub fn item(id: i64, title: &str, status: ItemStatus, reporter: i64) -> Item {
    Item {
        item_id: ItemId(id),
        title: title.to_string(),
        description: format!("{title} left near the library"),
        location: "Main Campus".to_string(),
        status,
        date_report: Some(report_date()),
        image_url: None,
        reporter_id: Some(UserId(reporter)),
        category_id: Some(CategoryId(1)),
        department_id: Some(DepartmentId(1)),
        category_name: Some("Bags".to_string()),
        department_name: Some("Main Campus".to_string()),
    }
}

/// A pending, unverified claim.
pub fn claim(id: i64, item: i64, claimant: i64) -> Claim {
    Claim {
        claim_id: ClaimId(id),
        item_id: ItemId(item),
        claimant_id: UserId(claimant),
        verification_answer: "It has my name on the tag".to_string(),
        contact_info: Some("0917 555 0101".to_string()),
        claim_date: None,
        status: ClaimStatus::Pending,
        verified: false,
    }
}

/// Report form for a Bags item at Main Campus.
pub fn draft(title: &str, status: ItemStatus) -> ItemDraft {
    ItemDraft {
        title: title.to_string(),
        description: "Navy blue with a keychain".to_string(),
        category_id: Some(CategoryId(1)),
        department_id: Some(DepartmentId(1)),
        date_report: Some(report_date()),
        status,
        image: None,
    }
}

/// Complete sign-up form.
pub fn registration(username: &str) -> Registration {
    Registration {
        username: username.to_string(),
        password: PASSWORD.to_string(),
        first_name: "Carla".to_string(),
        middle_name: String::new(),
        last_name: "Lim".to_string(),
        email: username.to_string(),
        contact_no: "09175550199".to_string(),
    }
}
