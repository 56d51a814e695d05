//! Fixed instruction sent to the vision assistant.
//!
//! The normalizer's field names are keyed to the JSON layout requested here,
//! so the text must stay word-for-word stable.

/// Opening sentence; the procedures line is inserted right after it.
const PROMPT_HEAD: &str = r##"Para cada área facial, analise e descreva EXATAMENTE o que mudou da foto ANTES para a foto DEPOIS:"##;

/// Region rubric, requested JSON layout and final rules.
const PROMPT_RUBRIC: &str = r##"

1. REGIÃO FRONTAL (testa):
   - Conte e compare rugas/linhas horizontais: aumentaram ou diminuíram da ANTES para DEPOIS?
   - Analise textura: melhorou ou piorou da ANTES para DEPOIS?
   - Avalie suavidade: aumentou ou diminuiu da ANTES para DEPOIS?

2. REGIÃO NASAL:
   - Analise textura: melhorou ou piorou da ANTES para DEPOIS?
   - Avalie uniformidade: aumentou ou diminuiu da ANTES para DEPOIS?
   - Compare refinamento geral: melhorou ou piorou da ANTES para DEPOIS?

3. ÁREA INFRAORBITAL (abaixo dos olhos):
   - Compare luminosidade: aumentou ou diminuiu da ANTES para DEPOIS?
   - Analise uniformidade de cor: melhorou ou piorou da ANTES para DEPOIS?
   - Avalie textura: melhorou ou piorou da ANTES para DEPOIS?

Retorne a análise em formato JSON:

{
  "areas": {
    "forehead": {
      "score": "A" a "F" (A=melhoria significativa DEPOIS vs ANTES, F=piora significativa DEPOIS vs ANTES),
      "description": "Descrição específica comparando ANTES vs DEPOIS: ex: 'aumento de rugas', 'redução de suavidade', 'melhoria na textura'",
      "metrics": {
        "wrinkle_reduction": número (POSITIVO se MENOS rugas na DEPOIS vs ANTES, NEGATIVO se MAIS rugas na DEPOIS vs ANTES),
        "smoothness_improvement": número (POSITIVO se MAIS suave na DEPOIS vs ANTES, NEGATIVO se MENOS suave na DEPOIS vs ANTES)
      }
    },
    "nose": {
      "score": "A" a "F",
      "description": "Descrição específica comparando ANTES vs DEPOIS: ex: 'piora na textura', 'melhoria na uniformidade'",
      "metrics": {
        "texture_improvement": número (POSITIVO se MELHOR textura na DEPOIS vs ANTES, NEGATIVO se PIOR textura na DEPOIS vs ANTES)
      }
    },
    "under_eye": {
      "score": "A" a "F",
      "description": "Descrição específica comparando ANTES vs DEPOIS: ex: 'redução de luminosidade', 'aumento de uniformidade', 'piora na textura'",
      "metrics": {
        "brightness_improvement": número (POSITIVO se MAIS claro na DEPOIS vs ANTES, NEGATIVO se MAIS escuro na DEPOIS vs ANTES),
        "uniformity_improvement": número (POSITIVO se MAIS uniforme na DEPOIS vs ANTES, NEGATIVO se MENOS uniforme na DEPOIS vs ANTES),
        "texture_improvement": número (POSITIVO se MELHOR textura na DEPOIS vs ANTES, NEGATIVO se PIOR textura na DEPOIS vs ANTES)
      }
    }
  },
  "global": {
    "apparent_age": {
      "after": número (idade aparente estimada da foto DEPOIS),
      "reduction": número (POSITIVO se DEPOIS parece MAIS JOVEM que ANTES, NEGATIVO se DEPOIS parece MAIS VELHA que ANTES)
    },
    "harmony": número (0-100, harmonia facial da foto DEPOIS)
  }
}

REGRAS FINAIS:
- Se a foto DEPOIS estiver melhor que a foto ANTES → métricas POSITIVAS, scores A/B/C
- Se a foto ANTES estiver melhor que a foto DEPOIS → métricas NEGATIVAS, scores D/E/F
- Se não houver diferença significativa → métricas próximas de ZERO, score D

Retorne APENAS o JSON, sem texto adicional."##;

/// Build the full prompt, mentioning the performed procedures when given.
pub fn build_analysis_prompt(procedures: &[String]) -> String {
    let procedures_text = if procedures.is_empty() {
        String::new()
    } else {
        format!("\n\nProcedimentos realizados: {}", procedures.join(", "))
    };
    format!("{PROMPT_HEAD}{procedures_text}{PROMPT_RUBRIC}")
}
