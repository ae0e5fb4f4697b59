//! Demo data matching the seeded staff accounts (ids "1".."5")

use crate::{
    access::Role,
    portal::models::{
        Absence, Announcement, LeaveRequest, LeaveStatus, LeaveType, Notification,
        ProjectStatus, ResearchProject, Salary,
    },
};
use chrono::{DateTime, TimeZone, Utc};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

pub fn announcements() -> Vec<Announcement> {
    vec![
        Announcement {
            id: "1".into(),
            title: "New Semester Registration".into(),
            content: "Registration for the new semester begins on September 1st. All faculty members must verify their teaching schedules.".into(),
            created_by: "1".into(),
            created_at: at(2023, 8, 15, 10, 0),
            approved: true,
            approved_by: Some("1".into()),
            for_roles: Role::ALL.to_vec(),
        },
        Announcement {
            id: "2".into(),
            title: "Faculty Meeting".into(),
            content: "There will be a faculty meeting on August 25th at 2:00 PM in the main hall. Attendance is mandatory for all teaching staff.".into(),
            created_by: "2".into(),
            created_at: at(2023, 8, 10, 14, 30),
            approved: true,
            approved_by: Some("1".into()),
            for_roles: vec![Role::Dean, Role::Teacher],
        },
        Announcement {
            id: "3".into(),
            title: "Library System Upgrade".into(),
            content: "The library management system will be upgraded this weekend. Services will be unavailable from Friday evening to Sunday.".into(),
            created_by: "5".into(),
            created_at: at(2023, 8, 5, 9, 15),
            approved: true,
            approved_by: Some("1".into()),
            for_roles: vec![Role::Librarian, Role::Teacher],
        },
    ]
}

pub fn leave_requests() -> Vec<LeaveRequest> {
    vec![
        LeaveRequest {
            id: "1".into(),
            user_id: "3".into(),
            user_name: "Prof. Smith".into(),
            start_date: at(2023, 9, 15, 0, 0),
            end_date: at(2023, 9, 20, 0, 0),
            reason: "Family vacation".into(),
            status: LeaveStatus::Approved,
            approved_by: Some("2".into()),
            kind: LeaveType::Vacation,
        },
        LeaveRequest {
            id: "2".into(),
            user_id: "4".into(),
            user_name: "Jane Registrar".into(),
            start_date: at(2023, 9, 10, 0, 0),
            end_date: at(2023, 9, 12, 0, 0),
            reason: "Medical appointment".into(),
            status: LeaveStatus::Pending,
            approved_by: None,
            kind: LeaveType::Sick,
        },
        LeaveRequest {
            id: "3".into(),
            user_id: "5".into(),
            user_name: "Mark Librarian".into(),
            start_date: at(2023, 10, 5, 0, 0),
            end_date: at(2023, 10, 7, 0, 0),
            reason: "Personal matter".into(),
            status: LeaveStatus::Rejected,
            approved_by: Some("1".into()),
            kind: LeaveType::Personal,
        },
    ]
}

pub fn absences() -> Vec<Absence> {
    vec![
        Absence {
            id: "1".into(),
            user_id: "3".into(),
            user_name: "Prof. Smith".into(),
            date: at(2023, 8, 5, 0, 0),
            reason: Some("Sick leave".into()),
            reported: true,
        },
        Absence {
            id: "2".into(),
            user_id: "4".into(),
            user_name: "Jane Registrar".into(),
            date: at(2023, 8, 12, 0, 0),
            reason: Some("Family emergency".into()),
            reported: true,
        },
        Absence {
            id: "3".into(),
            user_id: "5".into(),
            user_name: "Mark Librarian".into(),
            date: at(2023, 8, 15, 0, 0),
            reason: None,
            reported: false,
        },
    ]
}

pub fn salaries() -> Vec<Salary> {
    vec![
        Salary::new("1", "3", 5000.0, 8, 2023, 500.0, 200.0),
        Salary::new("2", "4", 4000.0, 8, 2023, 200.0, 150.0),
        Salary::new("3", "5", 3800.0, 8, 2023, 200.0, 120.0),
    ]
}

pub fn research_projects() -> Vec<ResearchProject> {
    vec![
        ResearchProject {
            id: "1".into(),
            title: "Machine Learning Applications in Educational Settings".into(),
            description: "This research explores how machine learning can enhance learning outcomes in higher education.".into(),
            user_id: "3".into(),
            collaborators: vec!["2".into()],
            status: ProjectStatus::Ongoing,
            start_date: at(2023, 6, 1, 0, 0),
            end_date: None,
            publications: vec!["Journal of Educational Technology, 2023".into()],
        },
        ResearchProject {
            id: "2".into(),
            title: "Climate Change Effects on Campus Sustainability".into(),
            description: "Studying the impact of climate change on university campus sustainability initiatives.".into(),
            user_id: "3".into(),
            collaborators: vec![],
            status: ProjectStatus::Planning,
            start_date: at(2023, 10, 1, 0, 0),
            end_date: None,
            publications: vec![],
        },
        ResearchProject {
            id: "3".into(),
            title: "Digital Library Accessibility".into(),
            description: "Improving digital library accessibility for visually impaired users.".into(),
            user_id: "5".into(),
            collaborators: vec!["3".into()],
            status: ProjectStatus::Completed,
            start_date: at(2023, 1, 15, 0, 0),
            end_date: Some(at(2023, 7, 30, 0, 0)),
            publications: vec![
                "Library Technology Journal, 2023".into(),
                "Conference on Digital Accessibility, 2023".into(),
            ],
        },
    ]
}

pub fn notifications() -> Vec<Notification> {
    vec![
        Notification {
            id: "1".into(),
            user_id: "3".into(),
            message: "Your leave request has been approved".into(),
            read: false,
            created_at: at(2023, 8, 16, 10, 30),
            link: Some("/leave-requests".into()),
        },
        Notification {
            id: "2".into(),
            user_id: "4".into(),
            message: "New announcement: Faculty Meeting".into(),
            read: true,
            created_at: at(2023, 8, 10, 15, 0),
            link: Some("/announcements".into()),
        },
        Notification {
            id: "3".into(),
            user_id: "5".into(),
            message: "Your leave request has been rejected".into(),
            read: false,
            created_at: at(2023, 8, 17, 9, 45),
            link: Some("/leave-requests".into()),
        },
    ]
}
