//! 班级目录
//!
//! 列表与详情都附带学生数、作业数，由目录快照现算，不落库。

pub mod create;
pub mod get;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::Result;
use crate::models::assignments::entities::Assignment;
use crate::models::classes::entities::Class;
use crate::models::classes::requests::{ClassListParams, CreateClassRequest};
use crate::models::classes::responses::ClassSummary;
use crate::models::students::entities::Student;
use crate::storage::Storage;

pub struct ClassService;

impl ClassService {

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::injected(request)
    }

    pub async fn list_classes(
        &self,
        request: &HttpRequest,
        params: ClassListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_classes(self, request, params).await
    }

    pub async fn create_class(
        &self,
        req: &HttpRequest,
        class_data: CreateClassRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_class(self, req, class_data).await
    }

    pub async fn get_class(&self, req: &HttpRequest, class_id: i64) -> ActixResult<HttpResponse> {
        get::get_class(self, req, class_id).await
    }
}

/// 为班级附上学生数与作业数，保持输入顺序
pub fn summarize(
    classes: Vec<Class>,
    students: &[Student],
    assignments: &[Assignment],
) -> Vec<ClassSummary> {
    let mut student_counts: HashMap<i64, i64> = HashMap::new();
    for student in students {
        *student_counts.entry(student.class_id).or_default() += 1;
    }
    let mut assignment_counts: HashMap<i64, i64> = HashMap::new();
    for assignment in assignments {
        *assignment_counts.entry(assignment.class_id).or_default() += 1;
    }

    classes
        .into_iter()
        .map(|class| ClassSummary {
            student_count: student_counts.get(&class.id).copied().unwrap_or(0),
            assignment_count: assignment_counts.get(&class.id).copied().unwrap_or(0),
            class,
        })
        .collect()
}

/// 读取目录并汇总给定班级
pub(crate) async fn load_summaries(
    storage: &dyn Storage,
    classes: Vec<Class>,
) -> Result<Vec<ClassSummary>> {
    let students = storage.list_students(None).await?;
    let assignments = storage.list_assignments(None).await?;
    Ok(summarize(classes, &students, &assignments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::entities::AssignmentStatus;
    use chrono::Utc;

    fn class(id: i64, name: &str) -> Class {
        Class {
            id,
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    fn student(id: i64, class_id: i64) -> Student {
        Student {
            id,
            class_id,
            name: format!("学生{id}"),
            email: format!("s{id}@example.com"),
            student_no: None,
            joined_at: Utc::now(),
        }
    }

    #[test]
    fn test_summarize_counts_per_class() {
        let assignments = vec![Assignment {
            id: 1,
            class_id: 2,
            title: "期中".to_string(),
            knowledge: None,
            status: AssignmentStatus::Published,
            due_at: None,
            created_at: Utc::now(),
        }];
        let summaries = summarize(
            vec![class(1, "一班"), class(2, "二班")],
            &[student(1, 1), student(2, 1), student(3, 2)],
            &assignments,
        );

        let counts: Vec<(i64, i64, i64)> = summaries
            .iter()
            .map(|s| (s.class.id, s.student_count, s.assignment_count))
            .collect();
        assert_eq!(counts, vec![(1, 2, 0), (2, 1, 1)]);
    }
}
