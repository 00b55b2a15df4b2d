/// Разделитель имён файлов в сохранённом токене порядка
pub const DELIMITER: &str = ";;";

/// Упорядочить свежий список элементов по сохранённому токену.
///
/// Элементы из токена идут в его порядке, записи без элемента пропускаются.
/// Остальные элементы добавляются в конец в исходном порядке сканирования.
/// Без токена порядок не меняется.
pub fn reconcile<T, F>(items: Vec<T>, token: Option<&str>, file_name: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let Some(token) = token else {
        return items;
    };

    let mut pending: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(pending.len());

    for name in token.split(DELIMITER).filter(|name| !name.is_empty()) {
        let slot = pending
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|item| file_name(item) == name));

        if let Some(slot) = slot {
            ordered.extend(slot.take());
        }
    }

    ordered.extend(pending.into_iter().flatten());
    ordered
}

pub fn serialize<T, F>(items: &[T], file_name: F) -> String
where
    F: Fn(&T) -> &str,
{
    items
        .iter()
        .map(|item| file_name(item))
        .collect::<Vec<_>>()
        .join(DELIMITER)
}
