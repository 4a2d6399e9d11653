//! User-facing replies.

pub const MISSING_QUESTION: &str =
    "Por favor, incluye tu pregunta después del comando `!pregunta`.";
pub const SUGGESTIONS_HEADER: &str = "Quizás quisiste decir:";
pub const NO_ANSWER: &str = "Perdón, no tengo la respuesta a esa pregunta en este momento :(";
pub const QUESTION_FAILED: &str = "Hubo un error al procesar tu pregunta.";

pub const SUGGESTION_GONE: &str = "La pregunta sugerida ya no está disponible.";
pub const SELECTION_FAILED: &str = "Hubo un error al obtener la respuesta.";

pub const NO_RESERVATIONS: &str = "No hay reservas registradas actualmente.";
pub const RESERVATIONS_FAILED: &str =
    "Hubo un error al acceder a las reservas. Por favor, inténtalo de nuevo más tarde.";
pub const RESERVATIONS_DISABLED: &str =
    "La consulta de reservas no está disponible en este momento.";

const COMMANDS: &[&str] = &[
    "`!pregunta <tu_pregunta>`: Realiza una pregunta académica. \
     Intentaré buscar la respuesta en mi base de datos.",
    "`!reservas`: Muestra las reservas de aulas registradas.",
];

pub fn help(user: &str) -> String {
    format!(
        "¡Hola {user}! :) Soy botiano, tu bot académico de UMAI.\n\
         Aquí tienes una lista de los comandos disponibles:\n\n{}",
        COMMANDS.join("\n")
    )
}

pub fn mention(user: &str) -> String {
    format!(
        "¡Hola {user}! :) Parece que me mencionaste. Si tienes una pregunta académica, \
         usa el comando `!pregunta <tu_pregunta>`. \
         Si quieres ver la lista de comandos, usa `!botiano`."
    )
}

pub fn revealed(question: &str, answer: &str) -> String {
    format!("**{question}**\n{answer}")
}
