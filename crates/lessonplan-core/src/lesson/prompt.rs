//! Prompt construction for lesson plan generation.
//!
//! The prompt is a pure function of the request: the same request always
//! renders the same text, which is persisted alongside the generated
//! content for debugging.

use super::LessonPlanRequest;

/// Substituted when the request carries no `learning_context`.
pub const DEFAULT_LEARNING_CONTEXT: &str = "standard classroom";

/// Substituted when the request carries no `duration_minutes`.
pub const DEFAULT_DURATION: &str = "not specified";

/// Output contract embedded verbatim in every prompt.
pub const SCHEMA_REFERENCE: &str = r#"## Output Schema

{
  "ludic_introduction": "string",   // REQUIRED. Non-empty.
  "bncc_goal": "string",            // REQUIRED. Non-empty. Cite the BNCC skill code.
  "step_by_step": [                 // REQUIRED. At least 3 steps, in lesson order.
    {
      "etapa": "string",            // REQUIRED. Stage name.
      "tempo": "string",            // REQUIRED. Time allotted to the stage.
      "descricao": "string"         // REQUIRED. What the teacher and students do.
    }
  ],
  "rubric_evaluation": {            // REQUIRED. All four levels, non-empty.
    "excelente": "string",
    "bom": "string",
    "satisfatorio": "string",
    "em_desenvolvimento": "string"
  }
}
"#;

/// Worked example showing a response that satisfies [`SCHEMA_REFERENCE`].
pub const WORKED_EXAMPLE: &str = r#"## Example Response

{
  "ludic_introduction": "Vamos imaginar que somos plantas tomando sol no pátio da escola...",
  "bncc_goal": "EF07CI05 - Compreender o processo de fotossíntese e sua importância para os seres vivos.",
  "step_by_step": [
    { "etapa": "Introdução", "tempo": "10 minutos", "descricao": "Apresentação do tema com a dinâmica das plantas." },
    { "etapa": "Desenvolvimento", "tempo": "25 minutos", "descricao": "Explicação do processo com experimento em grupo." },
    { "etapa": "Conclusão", "tempo": "10 minutos", "descricao": "Revisão coletiva e registro no caderno." }
  ],
  "rubric_evaluation": {
    "excelente": "Explica o processo completo e relaciona com o cotidiano.",
    "bom": "Explica a maioria das etapas do processo.",
    "satisfatorio": "Reconhece os conceitos básicos.",
    "em_desenvolvimento": "Necessita de reforço nos conceitos principais."
  }
}
"#;

/// Build the full generation prompt for a validated request.
pub fn build_prompt(request: &LessonPlanRequest) -> String {
    let mut prompt = String::with_capacity(4096);

    // Role.
    prompt.push_str(
        "You are a pedagogy specialist and lesson-planning assistant aligned with the \
         BNCC (Base Nacional Comum Curricular), Brazil's national curriculum standard.\n",
    );
    prompt.push_str(
        "Your task is to write a detailed lesson plan from the parameters below. \
         Write every text value in Brazilian Portuguese.\n\n",
    );

    // Parameters.
    prompt.push_str("## Lesson Parameters\n\n");
    prompt.push_str(&format!("- Topic: {}\n", request.topic));
    prompt.push_str(&format!("- Grade level: {}\n", request.grade_level));
    prompt.push_str(&format!("- Subject: {}\n", request.subject));
    prompt.push_str(&format!(
        "- Learning context: {}\n",
        request
            .learning_context
            .as_deref()
            .unwrap_or(DEFAULT_LEARNING_CONTEXT)
    ));
    prompt.push_str(&format!(
        "- Duration: {} minutes\n\n",
        request.duration_minutes.as_deref().unwrap_or(DEFAULT_DURATION)
    ));

    // Output contract.
    prompt.push_str(
        "Your response MUST be a single valid JSON object with no introductory text, \
         explanation, or markdown formatting (no ```json fences). \
         It must have EXACTLY the structure below.\n\n",
    );
    prompt.push_str(SCHEMA_REFERENCE);
    prompt.push('\n');
    prompt.push_str(WORKED_EXAMPLE);

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> LessonPlanRequest {
        LessonPlanRequest {
            topic: "Fotossíntese".to_string(),
            grade_level: "7º ano".to_string(),
            subject: "Ciências".to_string(),
            learning_context: Some("Turma EJA (Educação de Jovens e Adultos)".to_string()),
            duration_minutes: Some("90".to_string()),
        }
    }

    fn minimal_request() -> LessonPlanRequest {
        LessonPlanRequest {
            topic: "Adição".to_string(),
            grade_level: "2º ano".to_string(),
            subject: "Matemática".to_string(),
            learning_context: None,
            duration_minutes: None,
        }
    }

    #[test]
    fn prompt_is_deterministic() {
        assert_eq!(build_prompt(&full_request()), build_prompt(&full_request()));
    }

    #[test]
    fn prompt_interpolates_all_fields() {
        let prompt = build_prompt(&full_request());
        assert!(prompt.contains("- Topic: Fotossíntese"));
        assert!(prompt.contains("- Grade level: 7º ano"));
        assert!(prompt.contains("- Subject: Ciências"));
        assert!(prompt.contains("Turma EJA (Educação de Jovens e Adultos)"));
        assert!(prompt.contains("- Duration: 90 minutes"));
        assert!(!prompt.contains(DEFAULT_LEARNING_CONTEXT));
    }

    #[test]
    fn prompt_uses_defaults_for_absent_fields() {
        let prompt = build_prompt(&minimal_request());
        assert!(prompt.contains("- Learning context: standard classroom"));
        assert!(prompt.contains("- Duration: not specified minutes"));
        assert!(prompt.contains("Adição"));
        assert!(prompt.contains("2º ano"));
        assert!(prompt.contains("Matemática"));
    }

    #[test]
    fn prompt_embeds_schema_and_example_verbatim() {
        let prompt = build_prompt(&minimal_request());
        assert!(prompt.contains(SCHEMA_REFERENCE));
        assert!(prompt.contains(WORKED_EXAMPLE));
        for key in [
            "ludic_introduction",
            "bncc_goal",
            "step_by_step",
            "rubric_evaluation",
            "em_desenvolvimento",
        ] {
            assert!(prompt.contains(key), "prompt should mention {key}");
        }
    }

    #[test]
    fn prompt_mentions_bncc_and_json_contract() {
        let prompt = build_prompt(&minimal_request());
        assert!(prompt.contains("BNCC"));
        assert!(prompt.contains("Base Nacional Comum Curricular"));
        assert!(prompt.contains("valid JSON object"));
    }

    #[test]
    fn special_characters_pass_through_unchanged() {
        let request = LessonPlanRequest {
            topic: "Operações com frações: adição & subtração (1/2 + 1/4)".to_string(),
            ..minimal_request()
        };
        let prompt = build_prompt(&request);
        assert!(prompt.contains("Operações com frações: adição & subtração (1/2 + 1/4)"));
    }

    #[test]
    fn worked_example_satisfies_the_parser() {
        let body = WORKED_EXAMPLE
            .strip_prefix("## Example Response\n\n")
            .expect("example heading");
        let plan = crate::lesson::parse_lesson_plan(body).expect("example should validate");
        assert_eq!(plan.step_by_step.len(), 3);
    }
}
