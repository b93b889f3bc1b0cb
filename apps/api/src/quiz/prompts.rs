// Prompt templates for question and feedback generation.
// Placeholders are filled by `quiz::prompt_builder`.

/// Question generation template.
/// Replace: {count}, {descriptor}, {level}, {role}, {snippet_field},
///          {example_kind}, {example}, {untrusted_instruction}, {json_instruction}
pub const QUESTION_PROMPT_TEMPLATE: &str = r#"Generate exactly {count} {descriptor} multiple-choice questions for a {level} level {role} position.

Requirements:
1. Format response as a valid JSON array of objects
2. Each question object should have:
    - "question": string (question text)
    - "options": string[] (exactly 4 options)
    - "correctAnswer": number (0-based index of correct option)
{snippet_field}    - "explanation": string (brief explanation of the answer)

3. Questions should test {level}-level knowledge appropriate for {role} role
4. For coding questions: provide executable code snippets and questions about output, errors, or optimizations
5. For theoretical questions: focus on core concepts and best practices
6. Include diverse topics relevant to the role
7. Vary the position of the correct option across questions

Example {example_kind} question format:
{example}

{untrusted_instruction}

{json_instruction}"#;

pub const CODE_SNIPPET_FIELD: &str =
    "    - \"codeSnippet\": string (relevant code snippet)\n";

pub const CODING_EXAMPLE: &str = r#"{
  "question": "What does this React component output?",
  "codeSnippet": "function MyComponent() {\n  const [count, setCount] = useState(0);\n  useEffect(() => {\n    setCount(c => c + 1);\n  }, []);\n  return <div>{count}</div>;\n}",
  "options": ["0", "1", "Infinitely increasing number", "Throws an error"],
  "correctAnswer": 1,
  "explanation": "useEffect runs once after initial render, incrementing count to 1"
}"#;

pub const THEORY_EXAMPLE: &str = r#"{
  "question": "What is the purpose of React hooks?",
  "options": [
    "To handle CSS styling in components",
    "To manage state and side effects in functional components",
    "To create class-based components",
    "To handle routing in React applications"
  ],
  "correctAnswer": 1,
  "explanation": "Hooks allow functional components to use state and other React features"
}"#;

/// Feedback template.
/// Replace: {level}, {role}, {score}, {correct}, {total}, {breakdown}
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"You are a senior technical career coach mentoring a software developer who is preparing for job interviews.

The candidate has completed a "{level}" level assessment for the "{role}" role and scored {score}% ({correct} out of {total} questions correct).

Below is the detailed breakdown of their test:
{breakdown}

Please provide detailed, constructive, and personalized feedback with the following sections. Put each section header on its own line, followed by a colon.

Performance Summary:
- Offer an honest and encouraging overview of the candidate's test performance in 2-3 sentences.

Strengths:
- Identify technical areas and skills the candidate performed well in.
- Relate correct answers to real-world tasks or competencies.

Weaknesses:
- Highlight 2-3 areas the candidate struggled with (incorrect or unanswered questions).
- Provide short, understandable explanations about the gaps in understanding.

Improvement Suggestions:
- Recommend specific technical topics the candidate should study.
- Provide at least 2 free or open-source online resources for each topic.
- Suggest 2-3 realistic and relevant mini-projects the candidate can build to reinforce their learning, each with a title and short description.

Career Roadmap:
- Provide a 3-6 month milestone-based plan with actionable steps to prepare for job applications.
- Include when to revise core concepts, build projects, contribute to open source, prepare a resume/portfolio, and start applying.

Be supportive but direct. Encourage growth and consistency."#;
