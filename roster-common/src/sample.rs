//! Built-in records served when the sheet is unreachable at startup

use crate::record::{EnrollmentRecord, RawRow};

#[allow(clippy::too_many_arguments)]
fn sample(
    id: u64,
    student_name: &str,
    email: &str,
    course: &str,
    category: &str,
    enrollment_date: &str,
    status: &str,
    progress: i64,
    phone: &str,
    address: &str,
) -> EnrollmentRecord {
    EnrollmentRecord {
        id,
        student_name: student_name.to_string(),
        email: email.to_string(),
        course: course.to_string(),
        category: category.to_string(),
        enrollment_date: enrollment_date.to_string(),
        status: status.to_string(),
        progress,
        payment_status: "Paid".to_string(),
        phone: phone.to_string(),
        address: address.to_string(),
        age: String::new(),
        gender: String::new(),
        source: "Direct".to_string(),
        amount: String::new(),
        extra: RawRow::new(),
    }
}

/// Three fixed records, ids 1..=3
pub fn sample_records() -> Vec<EnrollmentRecord> {
    vec![
        sample(
            1,
            "John Doe",
            "john.doe@email.com",
            "React Development",
            "Programming",
            "2024-12-15",
            "Active",
            75,
            "+1234567890",
            "123 Main St",
        ),
        sample(
            2,
            "Jane Smith",
            "jane.smith@email.com",
            "UI/UX Design",
            "Design",
            "2024-12-14",
            "Active",
            60,
            "+1234567891",
            "456 Oak Ave",
        ),
        sample(
            3,
            "Mike Johnson",
            "mike.johnson@email.com",
            "Digital Marketing",
            "Marketing",
            "2024-12-13",
            "Completed",
            100,
            "+1234567892",
            "789 Pine St",
        ),
    ]
}
