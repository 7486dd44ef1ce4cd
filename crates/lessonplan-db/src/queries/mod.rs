pub mod lesson_plans;
