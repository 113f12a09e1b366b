use serde::{Deserialize, Serialize};

/// Язык сообщений пользователю. Carried in settings, not a process-wide global,
/// so two sessions in one process may speak different languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Ru,
    En,
}

/// Translate a key into the given language.
#[rustfmt::skip]
pub fn t(lang: Lang, key: &str) -> &'static str {
    let ru = lang == Lang::Ru;
    match key {
        // ── Instructions ────────────────────────────────────
        "hint.pick_point" => if ru { "Кликните, чтобы выбрать точку." } else { "Click to pick a point." },
        "hint.pick_start" => if ru { "Кликните, чтобы выбрать начальную точку." } else { "Click to pick the start point." },
        "hint.pick_end" => if ru { "Выберите конечную точку." } else { "Pick the end point." },
        "hint.points_added" => if ru { "Добавлено точек" } else { "Points added" },
        "hint.center" => if ru { "Начальная точка" } else { "Starting point" },
        "hint.enter_params" => if ru { "Введите параметры." } else { "Enter the parameters." },
        "hint.curve_points" => if ru { "Кликните по canvas для добавления точек." } else { "Click the canvas to add points." },
        "hint.transform_keys" => if ru { "Стрелки, +/-, WASD/QE, P/O: преобразования объекта." } else { "Arrows, +/-, WASD/QE, P/O transform the object." },

        // ── Validation ──────────────────────────────────────
        "err.no_reference_point" => if ru { "Сначала кликните по canvas для выбора начальной точки!" } else { "Click the canvas to pick the starting point first!" },
        "err.no_points" => if ru { "Добавьте хотя бы одну точку!" } else { "Add at least one point!" },
        "err.insufficient_points" => if ru { "Недостаточно точек, нужно не меньше" } else { "Not enough points, at least required" },
        "err.no_candidate" => if ru { "Сначала кликните по canvas для выбора точки!" } else { "Click the canvas to pick a point first!" },
        "err.no_segment" => if ru { "Сначала нарисуйте отрезок!" } else { "Draw a segment first!" },
        "err.no_object" => if ru { "Сначала загрузите 3D объект!" } else { "Load a 3D object first!" },
        "err.invalid_parameter" => if ru { "Некорректное значение параметра" } else { "Invalid parameter value" },
        "err.missing_parameter" => if ru { "Введите параметр" } else { "Enter parameter" },

        // ── Transport / import ──────────────────────────────
        "err.connection" => if ru { "Соединение с сервером потеряно" } else { "Connection to the server lost" },
        "err.not_connected" => if ru { "Нет соединения с сервером" } else { "Not connected to the server" },
        "err.bad_reply" => if ru { "Некорректный ответ сервера" } else { "Malformed server reply" },
        "err.import" => if ru { "Не удалось загрузить объект" } else { "Failed to load the object" },

        // ── Results ─────────────────────────────────────────
        "result.convex" => if ru { "Полигон выпуклый" } else { "The polygon is convex" },
        "result.not_convex" => if ru { "Полигон не выпуклый" } else { "The polygon is not convex" },
        "result.point_inside" => if ru { "Точка внутри полигона" } else { "The point is inside the polygon" },
        "result.point_outside" => if ru { "Точка снаружи полигона" } else { "The point is outside the polygon" },
        "result.intersects" => if ru { "Отрезок пересекает полигон" } else { "The segment intersects the polygon" },
        "result.no_intersection" => if ru { "Отрезок не пересекает полигон" } else { "The segment does not intersect the polygon" },
        "result.hull" => if ru { "Вершин выпуклой оболочки" } else { "Convex hull vertices" },
        "result.object_loaded" => if ru { "Загружено вершин" } else { "Vertices loaded" },

        // ── Fallback ────────────────────────────────────────
        _ => "???",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lang_is_ru() {
        assert_eq!(Lang::default(), Lang::Ru);
        assert_eq!(t(Lang::default(), "result.convex"), "Полигон выпуклый");
    }

    #[test]
    fn test_english() {
        assert_eq!(t(Lang::En, "err.no_segment"), "Draw a segment first!");
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(t(Lang::En, "no.such.key"), "???");
    }

    #[test]
    fn test_lang_serde() {
        assert_eq!(serde_json::to_string(&Lang::En).unwrap(), "\"en\"");
        let l: Lang = serde_json::from_str("\"ru\"").unwrap();
        assert_eq!(l, Lang::Ru);
    }
}
